//! Response Strategy Resolver: which statuses succeed and how the generated method
//! branches on the runtime status.

use crate::document::{ResponseTable, SchemaNode, StatusKey};

/// Runtime status test of one branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPredicate {
    /// `status === code`
    Exact(u16),
    /// `status >= d00 && status < (d+1)00`
    Range(u8),
    /// Any 2xx status; used when no responses are declared at all
    AnySuccess,
    /// Everything not matched by an earlier branch
    Default,
}

impl StatusPredicate {
    /// TypeScript condition over a `status` variable; `None` for the catch-all.
    pub fn condition(self) -> Option<String> {
        match self {
            StatusPredicate::Exact(code) => Some(format!("status === {code}")),
            StatusPredicate::Range(digit) => {
                let low = u16::from(digit) * 100;
                Some(format!("status >= {low} && status < {}", low + 100))
            }
            StatusPredicate::AnySuccess => Some("status >= 200 && status < 300".to_string()),
            StatusPredicate::Default => None,
        }
    }
}

/// One branch of the generated status dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseBranch {
    /// Status test guarding the branch.
    pub predicate: StatusPredicate,
    /// Body schema to decode; `None` means the body is not read.
    pub schema: Option<SchemaNode>,
    /// Whether the branch resolves the observable instead of rejecting.
    pub is_success: bool,
    /// Response description from the API document.
    pub description: Option<String>,
}

impl ResponseBranch {
    /// Suffix for the branch's local variables (`result200`, `result2XX`, `resultdefault`).
    pub fn label(&self) -> String {
        match self.predicate {
            StatusPredicate::Exact(code) => code.to_string(),
            StatusPredicate::Range(digit) => format!("{digit}XX"),
            StatusPredicate::AnySuccess | StatusPredicate::Default => "default".to_string(),
        }
    }
}

/// Ordered status branches of one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePlan {
    /// Branches in evaluation order.
    pub branches: Vec<ResponseBranch>,
}

impl ResponsePlan {
    /// Branches that resolve the observable.
    pub fn successes(&self) -> impl Iterator<Item = &ResponseBranch> {
        self.branches.iter().filter(|b| b.is_success)
    }

    /// Whether a catch-all branch closes the dispatch.
    pub fn has_default(&self) -> bool {
        self.branches
            .iter()
            .any(|b| b.predicate == StatusPredicate::Default)
    }

    /// Whether some success branch resolves without a body.
    pub fn has_empty_success(&self) -> bool {
        self.successes().any(|b| b.schema.is_none())
    }

    /// Literal codes of all non-catch-all branches.
    pub fn exact_codes(&self) -> Vec<u16> {
        self.branches
            .iter()
            .filter_map(|b| match b.predicate {
                StatusPredicate::Exact(code) => Some(code),
                _ => None,
            })
            .collect()
    }
}

/// Classify a response table into ordered branches.
///
/// Literal codes are evaluated in ascending order, then ranges, then `default`. A
/// declared entry succeeds when it lies in the 2xx range; `default` succeeds only when
/// `default_is_success` is set. An empty table yields a single void 2xx branch.
pub fn classify(responses: &ResponseTable, default_is_success: bool) -> ResponsePlan {
    if responses.is_empty() {
        return ResponsePlan {
            branches: vec![ResponseBranch {
                predicate: StatusPredicate::AnySuccess,
                schema: None,
                is_success: true,
                description: None,
            }],
        };
    }

    let branches = responses
        .iter()
        .map(|(key, response)| {
            let (predicate, is_success) = match *key {
                StatusKey::Code(code) => (StatusPredicate::Exact(code), key.is_success_range()),
                StatusKey::Range(digit) => (StatusPredicate::Range(digit), key.is_success_range()),
                StatusKey::Default => (StatusPredicate::Default, default_is_success),
            };
            ResponseBranch {
                predicate,
                schema: response.schema.clone(),
                is_success,
                description: response.description.clone(),
            }
        })
        .collect();
    ResponsePlan { branches }
}
