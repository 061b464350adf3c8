use serde::Deserialize;
use std::fmt;

/// The role a connection plays for its task.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    /// Data read on every execution.
    Input,

    /// Data that must already exist before the pipeline runs.
    PrerequisiteInput,

    /// Data written on every execution.
    Output,

    /// Data read once when the task is constructed.
    InitInput,

    /// Data written once when the task is constructed.
    InitOutput,
}

impl ConnectionKind {
    pub const ALL: [ConnectionKind; 5] = [
        ConnectionKind::Input,
        ConnectionKind::PrerequisiteInput,
        ConnectionKind::Output,
        ConnectionKind::InitInput,
        ConnectionKind::InitOutput,
    ];
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionKind::Input => "input",
            ConnectionKind::PrerequisiteInput => "prerequisite_input",
            ConnectionKind::Output => "output",
            ConnectionKind::InitInput => "init_input",
            ConnectionKind::InitOutput => "init_output",
        };
        f.write_str(name)
    }
}

/// A named data channel declared by a connections specification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    /// Default channel name, may contain `{template}` placeholders
    pub name: String,
    pub kind: ConnectionKind,
    pub doc: Option<String>,
}

impl ConnectionDescriptor {
    pub fn new(name: &str, kind: ConnectionKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            doc: None,
        }
    }

    pub fn input(name: &str) -> Self {
        Self::new(name, ConnectionKind::Input)
    }

    pub fn prerequisite_input(name: &str) -> Self {
        Self::new(name, ConnectionKind::PrerequisiteInput)
    }

    pub fn output(name: &str) -> Self {
        Self::new(name, ConnectionKind::Output)
    }

    pub fn init_input(name: &str) -> Self {
        Self::new(name, ConnectionKind::InitInput)
    }

    pub fn init_output(name: &str) -> Self {
        Self::new(name, ConnectionKind::InitOutput)
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }
}
