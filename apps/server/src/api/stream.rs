use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

use amora_core::events::Group;
use amora_core::users::Principal;

use crate::events::ChannelEvent;
use crate::main_lib::AppState;

/// Per-connection SSE stream. A user receives their own channel; admins
/// additionally receive the shared admin channel.
pub async fn stream_events(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();
    let user_channel = Group::User(principal.user_id.clone()).channel();
    let admin_channel = Group::Admins.channel();
    let is_admin = principal.is_admin;

    let stream = BroadcastStream::new(receiver).filter_map(move |message| {
        let user_channel = user_channel.clone();
        let admin_channel = admin_channel.clone();
        async move {
            let ChannelEvent { channel, event } = message.ok()?;
            let visible = channel == user_channel || (is_admin && channel == admin_channel);
            if !visible {
                return None;
            }
            let sse_event = Event::default()
                .event(event.kind())
                .json_data(&event)
                .ok()?;
            Some(Ok(sse_event))
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
