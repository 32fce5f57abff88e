//! Start-up provisioning of the platform super-admin.

use crate::auth::password;
use crate::config::SuperAdminSeed;
use crate::db::{
    MembershipRepository, Provisioner, Provisioning, SharedStore, StoreError, UserRepository,
};
use crate::models::{Membership, User};

/// Ensures the configured account exists, is flagged super-admin and holds the global
/// superadmin membership. Safe to run on every start.
pub async fn ensure_superadmin(store: &SharedStore, seed: &SuperAdminSeed) -> Result<User, String> {
    let existing = store.find_user_by_email(&seed.email).await.map_err(stringify)?;

    let Some(user) = existing else {
        let hash = password::hash(&seed.password)?;
        let mut user = User::new(&seed.email, hash, "Super", "Admin");
        user.is_superadmin = true;
        store
            .provision(&Provisioning {
                company: None,
                user: user.clone(),
                membership: Some(Membership::global_superadmin(user.id)),
            })
            .await
            .map_err(stringify)?;
        tracing::info!(email = %user.email, "super admin created");
        return Ok(user);
    };

    if !user.is_superadmin {
        store.mark_superadmin(user.id).await.map_err(stringify)?;
    }

    let has_global = store
        .list_user_memberships(user.id)
        .await
        .map_err(stringify)?
        .iter()
        .any(|m| m.company_id.is_none());
    if !has_global {
        store
            .create_membership(&Membership::global_superadmin(user.id))
            .await
            .map_err(stringify)?;
    }

    tracing::info!(email = %user.email, "super admin ensured");
    Ok(User { is_superadmin: true, ..user })
}

fn stringify(e: StoreError) -> String {
    format!("Failed to seed super admin: {e}")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::Role;

    fn seed() -> SuperAdminSeed {
        SuperAdminSeed { email: "root@dvra.io".into(), password: "rootpassword".into() }
    }

    #[tokio::test]
    async fn creates_user_with_global_membership() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let user = ensure_superadmin(&store, &seed()).await.unwrap();

        assert!(user.is_superadmin);
        let memberships = store.list_user_memberships(user.id).await.unwrap();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].company_id, None);
        assert_eq!(memberships[0].role, Role::Superadmin);
    }

    #[tokio::test]
    async fn running_twice_changes_nothing() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let first = ensure_superadmin(&store, &seed()).await.unwrap();
        let second = ensure_superadmin(&store, &seed()).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.count_users().await.unwrap(), 1);
        assert_eq!(store.list_user_memberships(first.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn promotes_existing_account() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let hash = password::hash("rootpassword").unwrap();
        let existing = store.create_user(&User::new("root@dvra.io", hash, "Ro", "Ot")).await.unwrap();

        let user = ensure_superadmin(&store, &seed()).await.unwrap();
        assert_eq!(user.id, existing.id);
        assert!(store.find_user(user.id).await.unwrap().unwrap().is_superadmin);
        assert!(store
            .list_user_memberships(user.id)
            .await
            .unwrap()
            .iter()
            .any(|m| m.company_id.is_none() && m.role == Role::Superadmin));
    }
}
