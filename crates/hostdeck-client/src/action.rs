//! Action vocabulary
//!
//! [`ActionKind`] names every intent the store reacts to; [`Action`] carries the
//! parameters of one invocation for [`ServiceController::dispatch`].
//!
//! [`ServiceController::dispatch`]: crate::controller::ServiceController::dispatch

use std::fmt;

use hostdeck_api::{CreateServiceForm, NewServiceForm, ScaleServiceForm};

use crate::store::RequestFailure;

/// Receives the parsed response body of a request, success or failure.
pub type BodyCallback = Box<dyn FnOnce(serde_json::Value) + Send + 'static>;

/// Receives the failure of a request, `None` on success.
pub type FailureCallback = Box<dyn FnOnce(Option<RequestFailure>) + Send + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    GetAll,
    GetAllOptions,
    GetService,
    CreateService,
    UpdateService,
    DeleteService,
    ToggleNewService,
    AddService,
    ClearError,
}

impl ActionKind {
    pub const ALL: [ActionKind; 9] = [
        ActionKind::GetAll,
        ActionKind::GetAllOptions,
        ActionKind::GetService,
        ActionKind::CreateService,
        ActionKind::UpdateService,
        ActionKind::DeleteService,
        ActionKind::ToggleNewService,
        ActionKind::AddService,
        ActionKind::ClearError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::GetAll => "getAll",
            ActionKind::GetAllOptions => "getAllOptions",
            ActionKind::GetService => "getService",
            ActionKind::CreateService => "createService",
            ActionKind::UpdateService => "updateService",
            ActionKind::DeleteService => "deleteService",
            ActionKind::ToggleNewService => "toggleNewService",
            ActionKind::AddService => "addService",
            ActionKind::ClearError => "clearError",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One invocation of an action with its parameters.
pub enum Action {
    GetAll,
    GetAllOptions,
    GetService {
        id: String,
        callback: Option<BodyCallback>,
        polling: bool,
    },
    CreateService {
        form: CreateServiceForm,
        callback: Option<BodyCallback>,
    },
    UpdateService {
        form: ScaleServiceForm,
        callback: Option<FailureCallback>,
    },
    DeleteService {
        id: String,
    },
    ToggleNewService,
    AddService {
        form: NewServiceForm,
    },
    ClearError,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::GetAll => ActionKind::GetAll,
            Action::GetAllOptions => ActionKind::GetAllOptions,
            Action::GetService { .. } => ActionKind::GetService,
            Action::CreateService { .. } => ActionKind::CreateService,
            Action::UpdateService { .. } => ActionKind::UpdateService,
            Action::DeleteService { .. } => ActionKind::DeleteService,
            Action::ToggleNewService => ActionKind::ToggleNewService,
            Action::AddService { .. } => ActionKind::AddService,
            Action::ClearError => ActionKind::ClearError,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::GetService { id, polling, .. } => f
                .debug_struct("GetService")
                .field("id", id)
                .field("polling", polling)
                .finish(),
            Action::CreateService { form, .. } => {
                f.debug_struct("CreateService").field("form", form).finish()
            }
            Action::UpdateService { form, .. } => {
                f.debug_struct("UpdateService").field("form", form).finish()
            }
            Action::DeleteService { id } => f.debug_struct("DeleteService").field("id", id).finish(),
            Action::AddService { form } => f.debug_struct("AddService").field("form", form).finish(),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        let names: Vec<_> = ActionKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "getAll",
                "getAllOptions",
                "getService",
                "createService",
                "updateService",
                "deleteService",
                "toggleNewService",
                "addService",
                "clearError",
            ]
        );
    }

    #[test]
    fn test_action_kind() {
        let action = Action::DeleteService {
            id: "abc".to_string(),
        };
        assert_eq!(action.kind(), ActionKind::DeleteService);
        assert_eq!(format!("{:?}", Action::ClearError), "clearError");
    }
}
