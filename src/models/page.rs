// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! List results.
//!
//! Collection endpoints answer either with a bare JSON array or with a
//! paginated envelope (`{"count", "next", "previous", "results"}`). Both
//! decode into [`Page`], so call sites never branch on the shape.

use serde::{Deserialize, Serialize};

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ListResponse<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    pub results: Vec<T>,
    /// Total number of records, when known
    pub count: Option<u64>,
    /// URL of the next page, if any
    pub next: Option<String>,
    /// URL of the previous page, if any
    pub previous: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Bare(Vec<T>),
    Envelope {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },
}

impl<T> From<ListResponse<T>> for Page<T> {
    fn from(response: ListResponse<T>) -> Self {
        match response {
            ListResponse::Bare(results) => Page {
                count: Some(results.len() as u64),
                results,
                next: None,
                previous: None,
            },
            ListResponse::Envelope {
                results,
                count,
                next,
                previous,
            } => Page {
                results,
                count,
                next,
                previous,
            },
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Page {
            results: Vec::new(),
            count: Some(0),
            next: None,
            previous: None,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    /// Keep at most `limit` results. `count` still reports the server total.
    pub fn truncate(mut self, limit: usize) -> Self {
        self.results.truncate(limit);
        self
    }

    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}
