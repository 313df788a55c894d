use crate::state::Identity;

/// Available identities and which one questions are asked as
#[derive(Debug, Default, Clone)]
pub struct IdentitySelector {
    identities: Vec<Identity>,
    selected: Option<i64>,
}

impl IdentitySelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the identity list; with no prior selection the first entry is selected
    pub fn set_identities(&mut self, identities: Vec<Identity>) {
        self.identities = identities;
        if self.selected.is_none() {
            self.selected = self.identities.first().map(|identity| identity.id);
        }
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Identity> {
        let id = self.selected?;
        self.identities.iter().find(|identity| identity.id == id)
    }

    /// Select by id; unknown ids are ignored
    pub fn select(&mut self, id: i64) -> bool {
        if self.identities.iter().any(|identity| identity.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }
}
