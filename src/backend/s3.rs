use std::fs::File;
use std::io::{Cursor, Write};
use std::str::FromStr;
use std::string::ToString;

use futures::stream::{iter_ok, Stream};
use futures::Future;
use rusoto_core::credential::StaticProvider;
use rusoto_core::{HttpClient, Region};
use rusoto_s3::{self as s3_api, S3Client, S3 as S3Api};
use url::{Host, Url};

use crate::backend::futures_ext::FuturesExt;
use crate::backend::{Backend, DownloadRequest, ListPage, UploadRequest};
use crate::config::Credentials;
use crate::errors::ResultExt;
use crate::{mmap, Error};

const S3_URI_SCHEME: &str = "s3";
const REGION_QUERY_KEY: &str = "region";
const ENDPOINT_QUERY_KEY: &str = "endpoint";
const CHUNK_SIZE: usize = 1024 * 1024 * 100; // 100mb blocks
const CONCURRENCY: usize = 16;

#[derive(Debug)]
pub struct S3 {
    bucket_name: String,
    region: Region,
    credentials: Option<Credentials>,
}

impl S3 {
    pub fn from(uri: &Url, credentials: Option<Credentials>) -> Result<Self, Error> {
        let bucket_name = match uri.host() {
            Some(Host::Domain(host)) => host.to_string(),
            host => {
                let err = format!("Unrecognized bucket '{:?}'", host);
                return Err(Error::config(err));
            }
        };

        let mut query = uri.query_pairs();

        let default_region = query
            .clone()
            .find(|it| it.0.as_ref() == REGION_QUERY_KEY)
            .map(|it| it.1.to_string());

        let endpoint = query
            .find(|it| it.0.as_ref() == ENDPOINT_QUERY_KEY)
            .map(|it| it.1.to_string());

        let region = match (default_region, endpoint) {
            (_, Some(endpoint)) => Region::Custom {
                name: "custom".into(),
                endpoint,
            },
            (Some(name), _) => {
                Region::from_str(name.as_str()).unwrap_or_else(|_| Region::default())
            }
            _ => Region::default(),
        };

        let s3 = S3 {
            bucket_name,
            region,
            credentials,
        };

        Ok(s3)
    }

    pub fn scheme() -> &'static str {
        S3_URI_SCHEME
    }

    fn client(&self) -> Result<S3Client, Error> {
        let client = match &self.credentials {
            Some(creds) => {
                let dispatcher = HttpClient::new().map_err(Error::config)?;
                let provider = StaticProvider::new_minimal(
                    creds.access_key_id.clone(),
                    creds.secret_access_key.clone(),
                );
                S3Client::new_with(dispatcher, provider, self.region.clone())
            }
            None => S3Client::new(self.region.clone()),
        };

        Ok(client)
    }
}

impl Backend for S3 {
    fn download(&self, req: DownloadRequest) -> Result<usize, Error> {
        let client = self.client()?;
        let path = &req.path.as_path();

        let get_object = s3_api::GetObjectRequest {
            bucket: self.bucket_name.clone(),
            key: req.key.clone(),
            ..Default::default()
        };

        let resp = client
            .get_object(get_object)
            .map_err(Error::storage)
            .sync()?;

        let content_len = resp.content_length.map(|it| it as usize).unwrap_or(0);

        if content_len == 0 {
            File::create(&path).io_err(&path)?;
            return Ok(0);
        }

        let body = resp.body.ok_or_else(|| Error::storage("body must be"))?;

        let (_file, mut dst) = mmap::write(path, content_len)?;
        let mut cursor = Cursor::new(dst.as_mut());

        body.map_err(Error::storage)
            .and_then(|chunk| cursor.write_all(&chunk).io_err(&path))
            .collect()
            .wait()?;

        Ok(content_len)
    }

    fn upload(&self, req: UploadRequest) -> Result<usize, Error> {
        let client = self.client()?;
        let key = req.key.clone();

        let (_file, len, src) = match mmap::read(&req.path) {
            Ok(mapped) => mapped,
            Err(_) if is_empty_file(&req.path) => {
                // Zero-length backup files cannot be mapped or multiparted
                let put = s3_api::PutObjectRequest {
                    bucket: self.bucket_name.clone(),
                    key,
                    ..Default::default()
                };
                client.put_object(put).map_err(Error::storage).sync()?;
                return Ok(0);
            }
            Err(err) => return Err(err),
        };

        let upload = s3_api::CreateMultipartUploadRequest {
            bucket: self.bucket_name.clone(),
            key: key.clone(),
            ..Default::default()
        };

        let upload = client
            .create_multipart_upload(upload)
            .map_err(Error::storage)
            .sync()?;

        let upload_id = upload
            .upload_id
            .ok_or_else(|| Error::storage("upload_id cannot be empty"))?;

        let parts = src
            .chunks(CHUNK_SIZE)
            .enumerate()
            .map(|(part_number, chunk)| {
                let part_number = (part_number + 1) as i64;
                let body = Vec::from(chunk);
                let part = s3_api::UploadPartRequest {
                    body: Some(body.into()),
                    bucket: self.bucket_name.clone(),
                    key: key.clone(),
                    upload_id: upload_id.clone(),
                    part_number,
                    ..Default::default()
                };
                client
                    .upload_part(part)
                    .map(move |res| s3_api::CompletedPart {
                        e_tag: res.e_tag.clone(),
                        part_number: Some(part_number),
                    })
            })
            .collect::<Vec<_>>();

        let parts = iter_ok(parts)
            .buffered(CONCURRENCY)
            .collect()
            .map_err(Error::storage)
            .sync()?;

        let complete = s3_api::CompleteMultipartUploadRequest {
            bucket: self.bucket_name.clone(),
            key: key.clone(),
            upload_id,
            multipart_upload: Some(s3_api::CompletedMultipartUpload { parts: Some(parts) }),
            ..Default::default()
        };

        client
            .complete_multipart_upload(complete)
            .map_err(Error::storage)
            .sync()?;

        Ok(len)
    }

    fn list_page(&self, prefix: &str, token: Option<String>) -> Result<ListPage, Error> {
        let client = self.client()?;

        let list = s3_api::ListObjectsV2Request {
            bucket: self.bucket_name.clone(),
            prefix: Some(prefix.to_string()),
            continuation_token: token,
            ..Default::default()
        };

        let resp = client
            .list_objects_v2(list)
            .map_err(Error::listing(prefix.to_string()))
            .sync()?;

        let keys = resp
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|obj| obj.key)
            .collect();

        Ok(ListPage {
            keys,
            next: resp.next_continuation_token,
        })
    }
}

fn is_empty_file(path: &std::path::Path) -> bool {
    path.metadata().map(|meta| meta.len() == 0).unwrap_or(false)
}

impl ToString for S3 {
    fn to_string(&self) -> String {
        let buf = format!("s3://{}", self.bucket_name);

        match &self.region {
            Region::Custom {
                name: _name,
                endpoint,
            } => format!("{}?endpoint={}", buf, endpoint),
            region => format!("{}?region={}", buf, region.name()),
        }
    }
}
