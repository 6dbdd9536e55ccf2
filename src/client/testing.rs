//! Scripted in-memory [`MicrocksApi`] used by command tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{MicrocksApi, TestRunHandle, TestRunRequest, TestRunStatus};
use crate::error::{ClientError, ClientResult};

/// Replays canned responses and records every call.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    create: Mutex<Option<ClientResult<TestRunHandle>>>,
    statuses: Mutex<VecDeque<ClientResult<TestRunStatus>>>,
    uploads: Mutex<VecDeque<ClientResult<String>>>,
    pub(crate) created: Mutex<Vec<TestRunRequest>>,
    pub(crate) polled: Mutex<Vec<TestRunHandle>>,
    pub(crate) uploaded: Mutex<Vec<(PathBuf, bool)>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_create(self, result: ClientResult<TestRunHandle>) -> Self {
        *self.create.lock().unwrap() = Some(result);
        self
    }

    /// Queue a status. The last queued status repeats once the queue drains.
    pub(crate) fn then_status(self, result: ClientResult<TestRunStatus>) -> Self {
        self.statuses.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn then_upload(self, result: ClientResult<String>) -> Self {
        self.uploads.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn poll_count(&self) -> usize {
        self.polled.lock().unwrap().len()
    }
}

pub(crate) fn status(id: &str, in_progress: bool, success: bool) -> TestRunStatus {
    TestRunStatus {
        id: id.to_string(),
        success,
        in_progress,
        ..TestRunStatus::default()
    }
}

fn replay<T: Clone>(result: &ClientResult<T>) -> ClientResult<T> {
    match result {
        Ok(value) => Ok(value.clone()),
        Err(e) => Err(ClientError::Transport(e.to_string())),
    }
}

#[async_trait]
impl MicrocksApi for ScriptedClient {
    async fn create_test_result(&self, request: &TestRunRequest) -> ClientResult<TestRunHandle> {
        self.created.lock().unwrap().push(request.clone());
        self.create
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ClientError::Transport("no create response scripted".into())))
    }

    async fn get_test_result(&self, handle: &TestRunHandle) -> ClientResult<TestRunStatus> {
        self.polled.lock().unwrap().push(handle.clone());
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            return statuses.pop_front().unwrap();
        }
        match statuses.front() {
            Some(last) => replay(last),
            None => Err(ClientError::Transport("no status scripted".into())),
        }
    }

    async fn upload_artifact(&self, path: &Path, main_artifact: bool) -> ClientResult<String> {
        self.uploaded
            .lock()
            .unwrap()
            .push((path.to_path_buf(), main_artifact));
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport("no upload response scripted".into())))
    }
}
