//! BDD step definitions for datastore transfers.

use cpi_infra::{Datastore, Host, HostMount, HostRuntime, TransferBody};
use rstest_bdd_macros::{given, then, when};

use super::test_helpers::{TransferContext, block_on};

#[given("a datastore \"{datastore}\" mounted on a healthy host \"{host}\"")]
fn healthy_datastore(transfer_context: &TransferContext, datastore: String, host: String) {
    transfer_context.datastore.replace(Datastore::new(
        datastore,
        vec![HostMount::from(Host::new(host, HostRuntime::healthy()))],
    ));
}

#[given("a datastore \"{datastore}\" mounted only on host \"{host}\" in maintenance mode")]
fn maintenance_datastore(transfer_context: &TransferContext, datastore: String, host: String) {
    let runtime = HostRuntime {
        in_maintenance_mode: true,
        ..HostRuntime::healthy()
    };
    transfer_context.datastore.replace(Datastore::new(
        datastore,
        vec![HostMount::from(Host::new(host, runtime))],
    ));
}

#[given("the host answers \"{status}\" with \"{body}\"")]
fn host_answers_with_body(transfer_context: &TransferContext, status: u16, body: String) {
    transfer_context.http.push_response(status, body);
}

#[given("the host answers \"{status}\" \"{times}\" times")]
fn host_answers_repeatedly(transfer_context: &TransferContext, status: u16, times: usize) {
    transfer_context.http.push_statuses(status, times);
}

#[when("I fetch \"{path}\" allowing \"{attempts}\" attempts")]
fn fetch_file(transfer_context: &TransferContext, path: String, attempts: u32) {
    let service = transfer_context.service(attempts);
    let datastore = transfer_context.datastore.borrow().clone();
    let outcome = block_on(service.fetch_from_datastore("dc-1", &datastore, &path));
    transfer_context.record(outcome);
}

#[when("I upload \"{payload}\" to \"{path}\"")]
fn upload_file(transfer_context: &TransferContext, payload: String, path: String) {
    let service = transfer_context.service(3);
    let datastore = transfer_context.datastore.borrow().clone();
    let outcome = block_on(service.upload_to_datastore(
        &datastore,
        &path,
        TransferBody::from(payload.into_bytes()),
    ));
    transfer_context.record(outcome.map(|()| None));
}

#[then("the file contents are \"{contents}\"")]
fn file_contents(transfer_context: &TransferContext, contents: String) {
    let outcome = transfer_context.outcome.borrow();
    let Some(Ok(Some(body))) = outcome.as_ref() else {
        panic!("expected file contents, got {outcome:?}");
    };
    assert_eq!(body.as_ref(), contents.as_bytes());
}

#[then("no file is returned")]
fn no_file(transfer_context: &TransferContext) {
    let outcome = transfer_context.outcome.borrow();
    assert!(
        matches!(outcome.as_ref(), Some(Ok(None))),
        "expected an absent file, got {outcome:?}"
    );
}

#[then("the upload succeeded")]
fn upload_succeeded(transfer_context: &TransferContext) {
    let outcome = transfer_context.outcome.borrow();
    assert!(
        matches!(outcome.as_ref(), Some(Ok(_))),
        "expected the upload to succeed, got {outcome:?}"
    );
}

#[then("the transfer fails with \"{message}\"")]
fn transfer_fails(transfer_context: &TransferContext, message: String) {
    let outcome = transfer_context.outcome.borrow();
    let Some(Err(error)) = outcome.as_ref() else {
        panic!("expected the transfer to fail, got {outcome:?}");
    };
    assert_eq!(error.to_string(), message);
}

#[then("\"{count}\" service tickets were requested")]
fn tickets_requested(transfer_context: &TransferContext, count: usize) {
    assert_eq!(transfer_context.session.requests().len(), count);
}

#[then("the last request carried header \"{name}\" with \"{value}\"")]
fn last_request_header(transfer_context: &TransferContext, name: String, value: String) {
    let calls = transfer_context.http.calls();
    let Some(call) = calls.last() else {
        panic!("no request was sent");
    };
    assert_eq!(call.header(&name), Some(value.as_str()));
}
