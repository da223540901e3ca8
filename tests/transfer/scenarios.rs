use super::test_helpers::{TransferContext, transfer_context};
use rstest_bdd_macros::scenario;

#[scenario(path = "tests/features/transfer.feature", name = "Fetch an existing file")]
fn scenario_fetch_existing(transfer_context: TransferContext) {
    let _ = transfer_context;
}

#[scenario(path = "tests/features/transfer.feature", name = "Fetch a missing file")]
fn scenario_fetch_missing(transfer_context: TransferContext) {
    let _ = transfer_context;
}

#[scenario(
    path = "tests/features/transfer.feature",
    name = "Give up after repeated server errors"
)]
fn scenario_retries_exhausted(transfer_context: TransferContext) {
    let _ = transfer_context;
}

#[scenario(
    path = "tests/features/transfer.feature",
    name = "Recover from a transient server error"
)]
fn scenario_transient_recovery(transfer_context: TransferContext) {
    let _ = transfer_context;
}

#[scenario(
    path = "tests/features/transfer.feature",
    name = "Refuse a datastore without healthy hosts"
)]
fn scenario_no_healthy_host(transfer_context: TransferContext) {
    let _ = transfer_context;
}

#[scenario(path = "tests/features/transfer.feature", name = "Upload a payload")]
fn scenario_upload(transfer_context: TransferContext) {
    let _ = transfer_context;
}
