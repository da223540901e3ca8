//! Shared state for transfer scenarios.

use std::cell::RefCell;

use bytes::Bytes;
use cpi_infra::test_support::{ScriptedHttpClient, ScriptedSessionManager};
use cpi_infra::{
    Datastore, FileTransferService, RetryPolicy, Retryer, TransferError,
};
use rstest::fixture;

use crate::test_constants::DATASTORE;

pub type TransferOutcome = Result<Option<Bytes>, TransferError>;

#[derive(Debug)]
pub struct TransferContext {
    pub http: ScriptedHttpClient,
    pub session: ScriptedSessionManager,
    pub datastore: RefCell<Datastore>,
    pub outcome: RefCell<Option<TransferOutcome>>,
}

impl TransferContext {
    pub fn service(
        &self,
        attempts: u32,
    ) -> FileTransferService<ScriptedHttpClient, ScriptedSessionManager> {
        FileTransferService::new(self.http.clone(), self.session.clone())
            .with_retryer(Retryer::new(RetryPolicy::immediate(attempts)))
    }

    pub fn record(&self, outcome: TransferOutcome) {
        self.outcome.replace(Some(outcome));
    }
}

#[fixture]
pub fn transfer_context() -> TransferContext {
    TransferContext {
        http: ScriptedHttpClient::new(),
        session: ScriptedSessionManager::new(),
        datastore: RefCell::new(Datastore::new(DATASTORE, Vec::new())),
        outcome: RefCell::new(None),
    }
}

pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Runtime::new()
        .unwrap_or_else(|err| panic!("failed to build tokio runtime: {err}"))
        .block_on(future)
}
