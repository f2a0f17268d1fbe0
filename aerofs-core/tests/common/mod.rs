#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use aerofs_core::{AeroError, Api, ApiResponse, EntityTag};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub target: String,
    pub args: Vec<String>,
    pub if_match: Option<EntityTag>,
    pub content: Option<Vec<u8>>,
}

enum Reply {
    Json(Value, HeaderMap),
    Bytes(Vec<u8>, HeaderMap),
    Empty(HeaderMap),
    Status(StatusCode),
}

/// Transport double: replays queued replies per operation and records every
/// call it receives, including the exact precondition state.
#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<Call>>,
    replies: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
}

fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(*name, HeaderValue::from_str(value).unwrap());
    }
    map
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_json(&self, op: &'static str, body: Value, etag: &str) -> &Self {
        self.push(op, Reply::Json(body, headers(&[("etag", etag)])))
    }

    pub fn reply_json_without_etag(&self, op: &'static str, body: Value) -> &Self {
        self.push(op, Reply::Json(body, HeaderMap::new()))
    }

    pub fn reply_content(
        &self,
        op: &'static str,
        content: &[u8],
        content_type: &str,
        etag: &str,
    ) -> &Self {
        let map = headers(&[("etag", etag), ("content-type", content_type)]);
        self.push(op, Reply::Bytes(content.to_vec(), map))
    }

    pub fn reply_empty(&self, op: &'static str) -> &Self {
        self.push(op, Reply::Empty(HeaderMap::new()))
    }

    pub fn reply_status(&self, op: &'static str, status: u16) -> &Self {
        self.push(op, Reply::Status(StatusCode::from_u16(status).unwrap()))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, op: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|call| call.op == op).collect()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls_to(op).len()
    }

    fn push(&self, op: &'static str, reply: Reply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(reply);
        self
    }

    fn record(
        &self,
        op: &'static str,
        target: &str,
        args: &[&str],
        if_match: Option<&EntityTag>,
        content: Option<&[u8]>,
    ) {
        self.calls.lock().unwrap().push(Call {
            op,
            target: target.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            if_match: if_match.cloned(),
            content: content.map(<[u8]>::to_vec),
        });
    }

    fn next(&self, op: &'static str) -> Result<Reply, AeroError> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(op)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Status(status)) => Err(AeroError::Api {
                status,
                body: String::new(),
            }),
            Some(reply) => Ok(reply),
            None => Err(AeroError::Api {
                status: StatusCode::NOT_IMPLEMENTED,
                body: format!("no reply queued for {op}"),
            }),
        }
    }

    fn json(&self, op: &'static str) -> Result<ApiResponse<Value>, AeroError> {
        match self.next(op)? {
            Reply::Json(body, headers) => Ok(ApiResponse::new(body, headers)),
            _ => panic!("{op} expects a json reply"),
        }
    }

    fn empty(&self, op: &'static str) -> Result<ApiResponse<()>, AeroError> {
        match self.next(op)? {
            Reply::Empty(headers) => Ok(ApiResponse::new((), headers)),
            _ => panic!("{op} expects an empty reply"),
        }
    }
}

#[async_trait]
impl Api for MockApi {
    async fn get_file(&self, file_id: &str) -> Result<ApiResponse<Value>, AeroError> {
        self.record("get_file", file_id, &[], None, None);
        self.json("get_file")
    }

    async fn get_file_content(&self, file_id: &str) -> Result<ApiResponse<Vec<u8>>, AeroError> {
        self.record("get_file_content", file_id, &[], None, None);
        match self.next("get_file_content")? {
            Reply::Bytes(body, headers) => Ok(ApiResponse::new(body, headers)),
            _ => panic!("get_file_content expects a bytes reply"),
        }
    }

    async fn get_file_path(&self, file_id: &str) -> Result<ApiResponse<Value>, AeroError> {
        self.record("get_file_path", file_id, &[], None, None);
        self.json("get_file_path")
    }

    async fn get_folder(&self, folder_id: &str) -> Result<ApiResponse<Value>, AeroError> {
        self.record("get_folder", folder_id, &[], None, None);
        self.json("get_folder")
    }

    async fn get_folder_children(
        &self,
        folder_id: &str,
    ) -> Result<ApiResponse<Value>, AeroError> {
        self.record("get_folder_children", folder_id, &[], None, None);
        self.json("get_folder_children")
    }

    async fn get_folder_path(&self, folder_id: &str) -> Result<ApiResponse<Value>, AeroError> {
        self.record("get_folder_path", folder_id, &[], None, None);
        self.json("get_folder_path")
    }

    async fn create_file(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<ApiResponse<Value>, AeroError> {
        self.record("create_file", parent_id, &[name], None, None);
        self.json("create_file")
    }

    async fn create_folder(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<ApiResponse<Value>, AeroError> {
        self.record("create_folder", parent_id, &[name], None, None);
        self.json("create_folder")
    }

    async fn move_file(
        &self,
        file_id: &str,
        parent_id: &str,
        name: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<Value>, AeroError> {
        self.record("move_file", file_id, &[parent_id, name], Some(if_match), None);
        self.json("move_file")
    }

    async fn move_folder(
        &self,
        folder_id: &str,
        parent_id: &str,
        name: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<Value>, AeroError> {
        self.record(
            "move_folder",
            folder_id,
            &[parent_id, name],
            Some(if_match),
            None,
        );
        self.json("move_folder")
    }

    async fn delete_file(
        &self,
        file_id: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<()>, AeroError> {
        self.record("delete_file", file_id, &[], Some(if_match), None);
        self.empty("delete_file")
    }

    async fn delete_folder(
        &self,
        folder_id: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<()>, AeroError> {
        self.record("delete_folder", folder_id, &[], Some(if_match), None);
        self.empty("delete_folder")
    }

    async fn share_folder(&self, folder_id: &str) -> Result<ApiResponse<()>, AeroError> {
        self.record("share_folder", folder_id, &[], None, None);
        self.empty("share_folder")
    }

    async fn upload_file_content(
        &self,
        file_id: &str,
        content: &[u8],
        if_match: &EntityTag,
    ) -> Result<ApiResponse<()>, AeroError> {
        self.record(
            "upload_file_content",
            file_id,
            &[],
            Some(if_match),
            Some(content),
        );
        self.empty("upload_file_content")
    }
}

pub fn file_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "parent": "root",
        "last_modified": "2013-12-17T23:09:11Z",
        "size": 42,
        "mime_type": "text/plain",
        "content_state": "AVAILABLE"
    })
}

pub fn folder_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "parent": "root",
        "is_shared": false
    })
}

pub fn shared_folder_json(id: &str, name: &str, sid: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "parent": "root",
        "is_shared": true,
        "sid": sid
    })
}
