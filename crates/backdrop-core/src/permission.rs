//! Motion-sensor capability gate.
//!
//! Some platforms only deliver orientation events after a permission prompt
//! that must be triggered from a user gesture. Others deliver them
//! unconditionally. Both cases go through the same gate so the input layer
//! only ever asks "may I listen now?".

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PermissionRequirement {
    /// Orientation events flow without asking.
    Unrestricted,
    /// A user-initiated request has to be granted first.
    UserGesture,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PermissionState {
    Unrequested,
    Granted,
    Denied,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    ListenNow,
    AwaitGesture,
}

#[derive(Clone, Debug)]
pub struct PermissionGate {
    requirement: PermissionRequirement,
    state: PermissionState,
    in_flight: bool,
}

impl PermissionGate {
    pub fn new(requirement: PermissionRequirement) -> Self {
        let state = match requirement {
            PermissionRequirement::Unrestricted => PermissionState::Granted,
            PermissionRequirement::UserGesture => PermissionState::Unrequested,
        };
        Self {
            requirement,
            state,
            in_flight: false,
        }
    }

    #[inline]
    pub fn requirement(&self) -> PermissionRequirement {
        self.requirement
    }

    #[inline]
    pub fn state(&self) -> PermissionState {
        self.state
    }

    #[inline]
    pub fn is_granted(&self) -> bool {
        self.state == PermissionState::Granted
    }

    #[inline]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn decision(&self) -> GateDecision {
        if self.is_granted() {
            GateDecision::ListenNow
        } else {
            GateDecision::AwaitGesture
        }
    }

    /// Mark a platform request as started. Returns `false` once access is
    /// granted or while a request is still pending. A denial may be retried.
    pub fn begin_request(&mut self) -> bool {
        if self.is_granted() || self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Record the platform's answer. A grant is never revoked by a later
    /// denial; a denial can still turn into a grant on retry.
    pub fn resolve(&mut self, granted: bool) -> PermissionState {
        self.in_flight = false;
        if granted {
            self.state = PermissionState::Granted;
        } else if self.state == PermissionState::Unrequested {
            self.state = PermissionState::Denied;
        }
        self.state
    }

    /// The request button stays up until access is granted.
    pub fn affordance_visible(&self) -> bool {
        self.requirement == PermissionRequirement::UserGesture && !self.is_granted()
    }
}
