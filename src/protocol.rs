//! JSON-lines protocol for driving a [`SearchProvider`] over stdio.
//!
//! One request object per line, one response object per line:
//!
//! ```text
//! {"seq":1,"method":"list_matches","terms":["git"]}
//! {"seq":1,"result":["/home/me/.csv-search-provider/links.txt:0"]}
//! {"seq":2,"method":"describe","ids":["/home/me/.csv-search-provider/links.txt:0"]}
//! {"seq":2,"result":[{"id":"...","title":"GitHub","subtitle":"https://github.com","icon":"web-browser"}]}
//! {"seq":3,"method":"activate","id":"..."}
//! {"seq":3,"result":{"outcome":"opened","uri":"https://github.com","via_fallback":false}}
//! {"seq":4,"method":"refine_matches","ids":["..."],"terms":["git","hub"]}
//! {"seq":5,"method":"cancel","id":"..."}
//! {"seq":5,"result":{"cancelled":1}}
//! ```
//!
//! Activations run in the background, so their replies can arrive after
//! replies to later requests. The optional `seq` is echoed back for
//! correlation. `cancel` stops pending activations of one entry, or of all
//! entries when `id` is omitted; a cancelled activation still replies, with
//! outcome `cancelled`.
//!
//! Malformed lines get `{"error": "..."}` and the session continues. At EOF
//! the session waits for pending activations before returning.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::provider::SearchProvider;
use crate::types::EntryId;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    ListMatches {
        terms: Vec<String>,
        #[serde(default)]
        limit: Option<usize>,
    },
    Describe {
        ids: Vec<EntryId>,
    },
    Activate {
        id: EntryId,
    },
    RefineMatches {
        ids: Vec<EntryId>,
        terms: Vec<String>,
        #[serde(default)]
        limit: Option<usize>,
    },
    Cancel {
        #[serde(default)]
        id: Option<EntryId>,
    },
}

/// A request line: the request plus the client's optional sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub seq: Option<u64>,
    #[serde(flatten)]
    pub request: Request,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Result(Value),
    Error(String),
}

impl Response {
    fn ok(value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Response::Result(value),
            Err(e) => Response::Error(e.to_string()),
        }
    }
}

/// A response line, tagged with the request's `seq` when it had one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(flatten)]
    pub response: Response,
}

#[derive(Debug, Serialize)]
struct Cancelled {
    cancelled: usize,
}

/// Answer a query. Returns `None` for requests that need session state
/// (`activate` and `cancel`).
pub async fn handle(provider: &SearchProvider, request: &Request) -> Option<Response> {
    let response = match request {
        Request::ListMatches { terms, limit } => {
            let ids = provider.list_matches(terms).await;
            Response::ok(apply_limit(provider, ids, *limit))
        }
        Request::Describe { ids } => Response::ok(provider.describe(ids).await),
        Request::RefineMatches { ids, terms, limit } => {
            let refined = provider.refine_matches(ids, terms).await;
            Response::ok(apply_limit(provider, refined, *limit))
        }
        Request::Activate { .. } | Request::Cancel { .. } => return None,
    };
    Some(response)
}

fn apply_limit(provider: &SearchProvider, ids: Vec<EntryId>, limit: Option<usize>) -> Vec<EntryId> {
    match limit {
        Some(max) => provider.filter_results(ids, max),
        None => ids,
    }
}

/// Parse a request line; errors become the response text.
pub fn parse_request(line: &str) -> Result<Envelope, String> {
    serde_json::from_str(line).map_err(|e| format!("invalid request: {e}"))
}

/// Recover `seq` from a line that did not parse as a request.
fn salvage_seq(line: &str) -> Option<u64> {
    serde_json::from_str::<Value>(line)
        .ok()?
        .get("seq")?
        .as_u64()
}

/// Activations in flight, keyed by an internal ticket.
#[derive(Default)]
struct Pending {
    next_ticket: u64,
    running: HashMap<u64, (EntryId, CancellationToken)>,
}

impl Pending {
    fn start(&mut self, id: EntryId, token: CancellationToken) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.running.insert(ticket, (id, token));
        ticket
    }

    fn finish(&mut self, ticket: u64) {
        self.running.remove(&ticket);
    }

    /// Cancel activations of `id`, or all of them. Returns how many were
    /// still live.
    fn cancel(&self, id: Option<&EntryId>) -> usize {
        let mut cancelled = 0;
        for (entry, token) in self.running.values() {
            if id.is_some_and(|id| id != entry) || token.is_cancelled() {
                continue;
            }
            token.cancel();
            cancelled += 1;
        }
        cancelled
    }

    fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}

/// One client connection's state.
struct Session {
    provider: SearchProvider,
    cancel: CancellationToken,
    pending: Pending,
    done: mpsc::UnboundedSender<(u64, Reply)>,
}

impl Session {
    /// Handle one non-blank line. Returns the reply to write now, if any.
    async fn answer(&mut self, line: &str) -> Option<Reply> {
        let Envelope { seq, request } = match parse_request(line) {
            Ok(envelope) => envelope,
            Err(message) => {
                return Some(Reply {
                    seq: salvage_seq(line),
                    response: Response::Error(message),
                });
            }
        };
        crate::debug_event!("serve", "request", "{request:?}");

        let response = match request {
            Request::Activate { id } => {
                self.spawn_activation(seq, id);
                return None;
            }
            Request::Cancel { id } => Response::ok(Cancelled {
                cancelled: self.pending.cancel(id.as_ref()),
            }),
            query => handle(&self.provider, &query).await?,
        };
        Some(Reply { seq, response })
    }

    fn spawn_activation(&mut self, seq: Option<u64>, id: EntryId) {
        // Child of the session token so shutdown reaches it, while `cancel`
        // only stops this one
        let token = self.cancel.child_token();
        let ticket = self.pending.start(id.clone(), token.clone());
        let provider = self.provider.clone();
        let done = self.done.clone();

        tokio::spawn(async move {
            let outcome = provider.activate(&id, &token).await;
            let reply = Reply {
                seq,
                response: Response::ok(outcome),
            };
            // The session may already be gone
            let _ = done.send((ticket, reply));
        });
    }
}

async fn write_reply<W: AsyncWrite + Unpin>(writer: &mut W, reply: &Reply) -> std::io::Result<()> {
    let mut encoded = serde_json::to_vec(reply)?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await
}

/// Serve requests from `reader` until EOF or cancellation.
///
/// Returns the number of replies written.
pub async fn serve_lines<R, W>(
    provider: &SearchProvider,
    reader: R,
    mut writer: W,
    cancel: &CancellationToken,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (done, mut finished) = mpsc::unbounded_channel();
    let mut session = Session {
        provider: provider.clone(),
        cancel: cancel.clone(),
        pending: Pending::default(),
        done,
    };
    let mut lines = reader.lines();
    let mut reading = true;
    let mut answered = 0;

    while reading || !session.pending.is_empty() {
        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            Some((ticket, reply)) = finished.recv() => {
                session.pending.finish(ticket);
                reply
            }
            line = lines.next_line(), if reading => {
                let Some(line) = line? else {
                    reading = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match session.answer(&line).await {
                    Some(reply) => reply,
                    None => continue,
                }
            }
        };

        write_reply(&mut writer, &reply).await?;
        answered += 1;
    }

    Ok(answered)
}
