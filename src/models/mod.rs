// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, BusinessSignals, Coordinates, Dimension, DirectoryQuery, MatchCandidate,
    MatchResult, MatchStatus, MatchTier, ScoreRecord, ScoringWeights,
};
pub use requests::{
    BatchEvaluateRequest, EvaluateScoreRequest, FindPartnersRequest, UpdateMatchStatusRequest,
};
pub use responses::{
    BatchEvaluateResponse, BatchFailure, ErrorResponse, EvaluateScoreResponse,
    FindPartnersResponse, HealthResponse, UpdateMatchStatusResponse,
};
