//! HTTP transport: one streaming GET, delivered to a [`BodySink`].
//!
//! [`CurlTransport`] drives libcurl's easy interface on the calling thread.
//! The trait exists so the fetcher can be exercised without a network.

use std::cell::RefCell;
use std::time::Duration;

use super::head::{HeadCollector, ResponseHead};
use crate::error::FetchError;

/// Whether the sink wants the body after seeing the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyControl {
    Continue,
    Stop,
}

/// Consumer of one response.
///
/// A transport calls `on_head` exactly once before any `on_chunk`, including for
/// empty bodies, unless the request fails first.
pub trait BodySink {
    fn on_head(&mut self, head: &ResponseHead) -> Result<BodyControl, FetchError>;
    fn on_chunk(&mut self, data: &[u8]) -> Result<(), FetchError>;
}

/// A GET to perform.
#[derive(Debug, Clone)]
pub struct TransportRequest<'a> {
    pub url: &'a str,
    /// Extra request headers as (name, value).
    pub headers: &'a [(String, String)],
    /// Preferred body chunk size in bytes.
    pub chunk_size: usize,
}

pub trait Transport: Send + Sync {
    /// Perform the GET. Returns `Ok` once the sink has seen the full body or asked to stop.
    fn get(&self, request: &TransportRequest<'_>, sink: &mut dyn BodySink) -> Result<(), FetchError>;
}

/// libcurl bounds for `CURLOPT_BUFFERSIZE`.
const MIN_BUFFER: usize = 1024;
const MAX_BUFFER: usize = 10 * 1024 * 1024;

/// Blocking libcurl transport. Follows up to 10 redirects.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    pub connect_timeout: Duration,
    /// Abort when the rate stays below `low_speed_limit` bytes/sec for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

#[derive(Default)]
struct CallbackState {
    head_seen: bool,
    stopped: bool,
    failure: Option<FetchError>,
}

impl Transport for CurlTransport {
    fn get(&self, request: &TransportRequest<'_>, sink: &mut dyn BodySink) -> Result<(), FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(request.url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.buffer_size(request.chunk_size.clamp(MIN_BUFFER, MAX_BUFFER))?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;

        let mut list = curl::easy::List::new();
        for (k, v) in request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if !request.headers.is_empty() {
            easy.http_headers(list)?;
        }

        let collector = RefCell::new(HeadCollector::default());
        let state = RefCell::new(CallbackState::default());
        let sink = RefCell::new(sink);

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                collector.borrow_mut().push_raw(data);
                true
            })?;
            transfer.write_function(|data| {
                let mut st = state.borrow_mut();
                let mut sink = sink.borrow_mut();
                if !st.head_seen {
                    st.head_seen = true;
                    let head = collector.borrow().head();
                    match sink.on_head(&head) {
                        Ok(BodyControl::Continue) => {}
                        Ok(BodyControl::Stop) => {
                            st.stopped = true;
                            return Ok(0); // abort transfer
                        }
                        Err(e) => {
                            st.failure = Some(e);
                            return Ok(0);
                        }
                    }
                }
                match sink.on_chunk(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        st.failure = Some(e);
                        Ok(0)
                    }
                }
            })?;
            transfer.perform()
        };

        let mut st = state.into_inner();
        if let Some(e) = st.failure.take() {
            return Err(e);
        }
        if st.stopped {
            return Ok(());
        }
        performed?;

        if !st.head_seen {
            // Empty body: the write callback never ran.
            let head = collector.into_inner().head();
            sink.into_inner().on_head(&head)?;
        }
        Ok(())
    }
}
