//! In-process S3 endpoint covering the calls `ObjectStorageProvider` makes:
//! CreateBucket, ListObjectsV2 and HEAD/GET/PUT/DELETE on objects.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

#[derive(Default)]
struct Store {
    buckets: HashMap<String, BTreeMap<String, Vec<u8>>>,
    /// Bucket names owned by some other account.
    foreign: HashSet<String>,
}

#[derive(Clone)]
pub struct FakeS3 {
    addr: SocketAddr,
    store: Arc<Mutex<Store>>,
}

impl FakeS3 {
    pub async fn start() -> Self {
        let store = Arc::new(Mutex::new(Store::default()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = Router::new().fallback(handle).with_state(store.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, store }
    }

    pub fn connection_string(&self) -> String {
        format!(
            "Endpoint=http://{};Region=us-east-1;AccessKey=test;SecretKey=test",
            self.addr
        )
    }

    /// Make `bucket` belong to another account, so creating it fails.
    pub fn reserve_foreign(&self, bucket: &str) {
        self.store.lock().unwrap().foreign.insert(bucket.to_string());
    }

    pub fn buckets(&self) -> Vec<String> {
        let mut names: Vec<_> = self.store.lock().unwrap().buckets.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.store
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn s3_error(status: StatusCode, code: &str) -> Response {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Error><Code>{code}</Code><Message>{code}</Message></Error>"
    );
    (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn list_objects(bucket: &str, objects: &BTreeMap<String, Vec<u8>>) -> Response {
    let mut body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <ListBucketResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <Name>{bucket}</Name><Prefix></Prefix><KeyCount>{}</KeyCount>\
         <MaxKeys>1000</MaxKeys><IsTruncated>false</IsTruncated>",
        objects.len()
    );
    for (key, data) in objects {
        body.push_str(&format!(
            "<Contents><Key>{}</Key><LastModified>2024-01-01T00:00:00.000Z</LastModified>\
             <ETag>\"etag\"</ETag><Size>{}</Size><StorageClass>STANDARD</StorageClass></Contents>",
            xml_escape(key),
            data.len()
        ));
    }
    body.push_str("</ListBucketResult>");
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

async fn handle(
    State(store): State<Arc<Mutex<Store>>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri.path().trim_start_matches('/');
    let (bucket, key) = path.split_once('/').unwrap_or((path, ""));
    let key = urlencoding::decode(key).unwrap().into_owned();
    let mut store = store.lock().unwrap();

    if key.is_empty() {
        return match method {
            Method::PUT if store.foreign.contains(bucket) => {
                s3_error(StatusCode::CONFLICT, "BucketAlreadyExists")
            }
            Method::PUT if store.buckets.contains_key(bucket) => {
                s3_error(StatusCode::CONFLICT, "BucketAlreadyOwnedByYou")
            }
            Method::PUT => {
                store.buckets.insert(bucket.to_string(), BTreeMap::new());
                StatusCode::OK.into_response()
            }
            Method::GET => match store.buckets.get(bucket) {
                Some(objects) => list_objects(bucket, objects),
                None => s3_error(StatusCode::NOT_FOUND, "NoSuchBucket"),
            },
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        };
    }

    let Some(objects) = store.buckets.get_mut(bucket) else {
        return s3_error(StatusCode::NOT_FOUND, "NoSuchBucket");
    };
    match method {
        Method::HEAD if objects.contains_key(&key) => StatusCode::OK.into_response(),
        Method::HEAD => StatusCode::NOT_FOUND.into_response(),
        Method::GET => match objects.get(&key) {
            Some(data) => (StatusCode::OK, data.clone()).into_response(),
            None => s3_error(StatusCode::NOT_FOUND, "NoSuchKey"),
        },
        Method::PUT => {
            objects.insert(key, body.to_vec());
            (StatusCode::OK, [(header::ETAG, "\"etag\"")]).into_response()
        }
        Method::DELETE => {
            objects.remove(&key);
            StatusCode::NO_CONTENT.into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}
