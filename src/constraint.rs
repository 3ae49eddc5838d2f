/// Referential action taken when a referenced row is updated or deleted.
///
/// Only [OnAction::NoAction] is enforced. The other actions are accepted and
/// recorded but behave like no constraint at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnAction {
    #[default]
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
}

/// The kind of change a foreign-key check is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

/// `slave_table.slave_field REFERENCES master_table.master_field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencesConstraint {
    pub slave_table: String,
    pub slave_field: String,
    pub master_table: String,
    pub master_field: String,
    pub on_delete: OnAction,
    pub on_update: OnAction,
}

impl ReferencesConstraint {
    pub fn new(
        slave_table: impl Into<String>,
        slave_field: impl Into<String>,
        master_table: impl Into<String>,
        master_field: impl Into<String>,
    ) -> Self {
        Self {
            slave_table: slave_table.into(),
            slave_field: slave_field.into(),
            master_table: master_table.into(),
            master_field: master_field.into(),
            on_delete: OnAction::NoAction,
            on_update: OnAction::NoAction,
        }
    }

    /// Whether this constraint forbids `action` on a master row that is
    /// still referenced.
    pub fn blocks(&self, action: Action) -> bool {
        let on = match action {
            Action::Update => self.on_update,
            Action::Delete => self.on_delete,
        };
        on == OnAction::NoAction
    }

    pub fn is_master(&self, table: &str, field: &str) -> bool {
        self.master_table == table && self.master_field == field
    }

    pub fn is_slave(&self, table: &str, field: &str) -> bool {
        self.slave_table == table && self.slave_field == field
    }
}
