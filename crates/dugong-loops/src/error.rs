use crate::model::{ComponentId, EdgeId, PortId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("self-loop edge {edge} is not incident to port {port}")]
    EdgeNotIncident { edge: EdgeId, port: PortId },
    #[error("port {port} does not belong to this node")]
    UnknownPort { port: PortId },
    #[error("self-loop edge {edge} does not belong to this node")]
    UnknownEdge { edge: EdgeId },
    #[error("self-loop component {component} has no ports")]
    EmptyComponent { component: ComponentId },
}

pub type Result<T> = std::result::Result<T, Error>;
