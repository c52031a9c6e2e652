//! Rule-based risk evaluation over recent activity windows.

mod risk_service;

pub use risk_service::RiskService;
