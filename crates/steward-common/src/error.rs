//! Error types for the steward operator
//!
//! Errors are structured with fields to aid debugging in production.
//! Every error that crosses a collaborator boundary carries the operation
//! that failed and the object it was acting on.
//!
//! Semantic problems with a user-authored spec are never errors: they are
//! reported through validation verdicts and Kubernetes events instead.

use thiserror::Error;

use crate::crd::Jenkins;

/// Main error type for steward operations
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error during {operation}: {source}")]
    Kube {
        /// What the controller was doing (e.g. "get jenkins default/ci")
        operation: String,
        /// The underlying kube-rs error
        #[source]
        source: kube::Error,
    },

    /// A delegated collaborator (provisioner, seed job runner, script runner) failed
    #[error("{collaborator} failed during {operation} for {resource}: {message}")]
    Collaborator {
        /// Collaborator name (e.g. "base-provisioner", "seed-jobs")
        collaborator: String,
        /// Operation being performed
        operation: String,
        /// Identity of the Jenkins object ("namespace/name")
        resource: String,
        /// Description of what failed
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Description of what failed
        message: String,
        /// Context where the error occurred (e.g. "reconciler", "runner")
        context: String,
    },
}

impl Error {
    /// Wrap a kube-rs error with the operation that produced it
    pub fn kube(operation: impl Into<String>, source: kube::Error) -> Self {
        Self::Kube {
            operation: operation.into(),
            source,
        }
    }

    /// Create a collaborator error with full context
    pub fn collaborator(
        collaborator: impl Into<String>,
        operation: impl Into<String>,
        resource: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Collaborator {
            collaborator: collaborator.into(),
            operation: operation.into(),
            resource: resource.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create an internal error with context
    pub fn internal_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// HTTP status code of the underlying API error, if any
    fn api_code(&self) -> Option<u16> {
        match self {
            Error::Kube {
                source: kube::Error::Api(ae),
                ..
            } => Some(ae.code),
            _ => None,
        }
    }

    /// True when the API server rejected a write because the resource version was stale
    pub fn is_conflict(&self) -> bool {
        self.api_code() == Some(409)
    }

    /// Check if this error is retryable
    ///
    /// Serialization errors are not retryable (code or schema bug).
    /// Kubernetes 4xx errors other than conflicts are not retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Kube { source, .. } => match source {
                kube::Error::Api(ae) => ae.code == 409 || !(400..500).contains(&ae.code),
                _ => true,
            },
            Error::Collaborator { .. } => true,
            Error::Serialization { .. } => false,
            Error::Internal { .. } => true,
        }
    }

    /// Get the context if this error has one
    pub fn context(&self) -> Option<&str> {
        match self {
            Error::Internal { context, .. } => Some(context),
            Error::Kube { operation, .. } => Some(operation),
            Error::Collaborator { operation, .. } => Some(operation),
            Error::Serialization { .. } => None,
        }
    }
}

/// Outcome of a write against the API server that uses optimistic concurrency.
///
/// Conflicts are expected whenever another writer touched the object since it
/// was read; they are not failures and callers requeue instead of erroring.
#[derive(Debug, Clone)]
pub enum PersistOutcome {
    /// The write was accepted; carries the object as stored by the server
    Updated(Box<Jenkins>),
    /// The write was rejected because the resource version was stale
    Conflict,
}

impl PersistOutcome {
    /// Classify the result of a kube write, turning 409s into `Conflict`
    pub fn from_write(
        operation: impl Into<String>,
        result: std::result::Result<Jenkins, kube::Error>,
    ) -> Result<Self, Error> {
        match result {
            Ok(obj) => Ok(Self::Updated(Box::new(obj))),
            Err(kube::Error::Api(ae)) if ae.code == 409 => Ok(Self::Conflict),
            Err(e) => Err(Error::kube(operation, e)),
        }
    }
}
