//! Single-writer actor.
//!
//! All ledger mutations are funneled through one background task holding
//! one dedicated connection; each job runs inside an immediate
//! transaction. This serializes writes (the ledger's concurrency unit)
//! while WAL keeps readers unblocked. Domain errors raised inside a job
//! roll the transaction back and reach the caller typed.

use std::any::Any;

use diesel::{Connection, SqliteConnection};
use tokio::sync::{mpsc, oneshot};

use amora_core::errors::Result;

use super::DbPool;
use crate::errors::StorageError;

type ErasedResult = std::result::Result<Box<dyn Any + Send + 'static>, StorageError>;
type Job = Box<dyn FnOnce(&mut SqliteConnection) -> ErasedResult + Send + 'static>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(Job, oneshot::Sender<ErasedResult>)>,
}

impl WriteHandle {
    /// Executes a job inside an immediate transaction on the writer's
    /// dedicated connection. Returning `Err` rolls the transaction back.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> std::result::Result<T, StorageError>
            + Send
            + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |conn| job(conn).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .expect("writer actor channel closed; the actor stopped");

        ret_rx
            .await
            .expect("writer actor dropped the reply sender")
            .map(|boxed| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("failed to downcast writer actor result"))
            })
            .map_err(Into::into)
    }
}

/// Spawns the writer actor. It owns one pooled connection for its whole
/// lifetime and processes jobs serially.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(Job, oneshot::Sender<ErasedResult>)>(1024);

    tokio::spawn(async move {
        let mut conn = pool
            .get()
            .expect("failed to get a connection for the writer actor");

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: ErasedResult =
                conn.immediate_transaction::<_, StorageError, _>(|c| job(c));
            // Receiver may have been dropped (request cancelled); fine.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
