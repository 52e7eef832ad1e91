#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use linear_mcp::auth::StaticSession;
use linear_mcp::operations::OperationDescriptor;
use linear_mcp::tools::LinearTools;
use linear_mcp::transport::{Transport, TransportError};

/// One recorded backend call.
#[derive(Debug, Clone)]
pub struct Call {
    pub operation: &'static str,
    pub variables: Map<String, Value>,
}

/// Transport that records every call and answers from a per-operation script.
/// An operation with no scripted response fails with a transport error.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<&'static str, VecDeque<Result<Value, TransportError>>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, operation: &'static str, data: Value) {
        self.push(operation, Ok(data));
    }

    pub fn fail(&self, operation: &'static str, message: &str) {
        self.push(operation, Err(TransportError::new(message)));
    }

    fn push(&self, operation: &'static str, response: Result<Value, TransportError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(
        &self,
        operation: &'static OperationDescriptor,
        variables: Map<String, Value>,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(Call {
            operation: operation.name,
            variables,
        });
        self.responses
            .lock()
            .unwrap()
            .get_mut(operation.name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::new(format!(
                    "no response scripted for {}",
                    operation.name
                )))
            })
    }
}

pub fn tools_with(transport: Arc<MockTransport>) -> LinearTools {
    LinearTools::new(Arc::new(StaticSession::new(transport)), 50)
}
