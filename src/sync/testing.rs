//! Scripted remote service for engine tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::app::{Result, ShelfError};
use crate::domain::{ActionRequest, StateFilter};
use crate::remote::{
    AddRequest, AddResponse, ItemPayload, RemoteClient, RetrieveResponse, SendResponse,
};

pub(crate) fn payload(id: &str, sort_id: i64) -> ItemPayload {
    ItemPayload {
        item_id: Some(id.into()),
        sort_id: Some(sort_id.to_string()),
        given_url: Some(format!("https://example.com/{}", id)),
        given_title: Some(format!("Item {}", id)),
        favorite: Some("0".into()),
        time_added: Some("1700000000".into()),
        ..Default::default()
    }
}

#[derive(Default)]
pub(crate) struct FakeRemote {
    lists: Mutex<HashMap<StateFilter, Vec<ItemPayload>>>,
    fail_fetch: AtomicBool,
    fail_submit: AtomicBool,
    reject_submit: AtomicBool,
    fetch_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    submit_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    submitted: Mutex<Vec<ActionRequest>>,
    added: Mutex<Vec<AddRequest>>,
    add_result: Mutex<Option<ItemPayload>>,
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_items(&self, state: StateFilter, items: Vec<ItemPayload>) {
        self.lists.lock().unwrap().insert(state, items);
    }

    pub(crate) fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Transport failure on submit/add.
    pub(crate) fn fail_submits(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }

    /// Service answers but refuses the action.
    pub(crate) fn reject_submits(&self, reject: bool) {
        self.reject_submit.store(reject, Ordering::SeqCst);
    }

    /// Hold the next fetch until the returned sender fires.
    pub(crate) fn gate_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.fetch_gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Hold the next submit until the returned sender fires.
    pub(crate) fn gate_next_submit(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.submit_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub(crate) fn set_add_result(&self, item: ItemPayload) {
        *self.add_result.lock().unwrap() = Some(item);
    }

    pub(crate) fn submitted(&self) -> Vec<ActionRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn added(&self) -> Vec<AddRequest> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteClient for FakeRemote {
    async fn fetch(&self, state: StateFilter) -> Result<RetrieveResponse> {
        let gate = self.fetch_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.await.ok();
        }

        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ShelfError::Remote("503 Service Unavailable".into()));
        }

        let items = self
            .lists
            .lock()
            .unwrap()
            .get(&state)
            .cloned()
            .unwrap_or_default();
        Ok(RetrieveResponse::from_items(items))
    }

    async fn submit(&self, actions: &[ActionRequest]) -> Result<SendResponse> {
        self.submitted.lock().unwrap().extend_from_slice(actions);

        let gate = self.submit_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.await.ok();
        }

        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(ShelfError::Remote("503 Service Unavailable".into()));
        }
        if self.reject_submit.load(Ordering::SeqCst) {
            let mut response = SendResponse::accepted(actions.len());
            response.action_results = vec![serde_json::Value::Bool(false); actions.len()];
            return Ok(response);
        }

        Ok(SendResponse::accepted(actions.len()))
    }

    async fn add(&self, request: &AddRequest) -> Result<AddResponse> {
        self.added.lock().unwrap().push(request.clone());

        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(ShelfError::Remote("503 Service Unavailable".into()));
        }

        let item = self.add_result.lock().unwrap().clone();
        Ok(AddResponse {
            status: Some(1),
            item,
        })
    }
}
