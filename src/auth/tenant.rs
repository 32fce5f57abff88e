use uuid::Uuid;

/// Which company a token speaks for. `Global` is the tenant-less context of
/// super-admins and users without an entered membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tenant {
    Global,
    Scoped(Uuid),
}

impl Tenant {
    pub fn company_id(self) -> Option<Uuid> {
        match self {
            Tenant::Global => None,
            Tenant::Scoped(id) => Some(id),
        }
    }

    pub fn is_global(self) -> bool {
        matches!(self, Tenant::Global)
    }
}

impl From<Option<Uuid>> for Tenant {
    fn from(company_id: Option<Uuid>) -> Self {
        company_id.map_or(Tenant::Global, Tenant::Scoped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_company_maps_to_tenant() {
        let id = Uuid::now_v7();
        assert_eq!(Tenant::from(None), Tenant::Global);
        assert_eq!(Tenant::from(Some(id)), Tenant::Scoped(id));
        assert_eq!(Tenant::Scoped(id).company_id(), Some(id));
        assert!(Tenant::Global.company_id().is_none());
    }
}
