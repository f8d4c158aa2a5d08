use crate::models::Profile;

/// Profile id assumed selected when the backend has none stored.
pub const DEFAULT_PROFILE_ID: &str = "Default";

/// One row of the profile list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRow {
    pub profile: Profile,
    /// `true` for the row matching the currently selected profile id.
    pub selected: bool,
}

/// Rows shown while the profile overlay is open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileSelector {
    rows: Vec<ProfileRow>,
}

impl ProfileSelector {
    /// Build the list, marking the row whose id matches `selected_id`.
    ///
    /// A missing or blank `selected_id` falls back to [`DEFAULT_PROFILE_ID`].
    pub fn build(profiles: Vec<Profile>, selected_id: Option<&str>) -> Self {
        let selected = effective_selection(selected_id);
        let rows = profiles
            .into_iter()
            .map(|profile| ProfileRow {
                selected: profile.id == selected,
                profile,
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[ProfileRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the selected row, if any row matches.
    pub fn selected_index(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.selected)
    }
}

/// Normalise a stored selection: blank or absent means [`DEFAULT_PROFILE_ID`].
pub fn effective_selection(selected_id: Option<&str>) -> &str {
    match selected_id.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => DEFAULT_PROFILE_ID,
    }
}

/// `true` when no profile has been chosen yet.
pub fn is_unselected(selected_id: Option<&str>) -> bool {
    selected_id.map(str::trim).map_or(true, str::is_empty)
}
