use crate::app::PlanError;
use crate::assets::AssetError;
use crate::session::SessionError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("usage: memepress <edit-plan.json>")]
    MissingPlanArgument,

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}
