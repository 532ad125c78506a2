use crate::domain::foundation::DateWindow;
use crate::domain::scope::{LocationOverride, UserScope};

/// Who is asking, over which window, optionally narrowed to one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
    pub user: UserScope,
    pub window: DateWindow,
    pub location: Option<LocationOverride>,
}

impl DashboardQuery {
    pub fn new(user: UserScope, window: DateWindow) -> Self {
        Self {
            user,
            window,
            location: None,
        }
    }

    pub fn narrowed_to(mut self, location: LocationOverride) -> Self {
        self.location = Some(location);
        self
    }
}
