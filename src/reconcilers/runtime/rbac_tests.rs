// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use super::super::*;

    fn binding(name: &str, managed: bool, users: &[&str]) -> ClusterRoleBinding {
        let mut binding = if managed {
            build_admin_binding(users.first().copied().unwrap_or_default())
        } else {
            ClusterRoleBinding::default()
        };
        binding.metadata.name = Some(name.to_string());
        binding.metadata.generate_name = None;
        binding.subjects = Some(
            users
                .iter()
                .map(|u| Subject {
                    kind: SUBJECT_KIND_USER.to_string(),
                    name: (*u).to_string(),
                    ..Subject::default()
                })
                .collect(),
        );
        binding
    }

    fn admins(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_build_admin_binding() {
        let binding = build_admin_binding("alice@example.com");

        assert!(is_managed(&binding));
        assert_eq!(binding.metadata.generate_name.as_deref(), Some("admin-"));
        assert!(binding.metadata.name.is_none());
        assert_eq!(binding.role_ref.kind, "ClusterRole");
        assert_eq!(binding.role_ref.name, "cluster-admin");
        let subjects = binding.subjects.unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].kind, "User");
        assert_eq!(subjects[0].name, "alice@example.com");
    }

    #[test]
    fn test_is_managed_requires_both_labels() {
        let mut binding = build_admin_binding("alice");
        assert!(is_managed(&binding));

        binding.labels_mut().remove(LABEL_APP);
        assert!(!is_managed(&binding));

        assert!(!is_managed(&ClusterRoleBinding::default()));
    }

    #[test]
    fn test_admins_to_add_skips_bound_admins() {
        let existing = vec![binding("admin-a", true, &["alice"])];
        let wanted = admins(&["alice", "bob"]);

        assert_eq!(admins_to_add(&existing, &wanted), vec!["bob"]);
    }

    #[test]
    fn test_admins_to_add_ignores_unmanaged_bindings() {
        let existing = vec![binding("someone-elses", false, &["alice"])];
        let wanted = admins(&["alice"]);

        assert_eq!(admins_to_add(&existing, &wanted), vec!["alice"]);
    }

    #[test]
    fn test_admins_to_add_deduplicates() {
        let wanted = admins(&["alice", "alice"]);
        assert_eq!(admins_to_add(&[], &wanted), vec!["alice"]);
    }

    #[test]
    fn test_bindings_to_remove_only_managed_stale_users() {
        let existing = vec![
            binding("admin-a", true, &["alice"]),
            binding("admin-b", true, &["mallory"]),
            binding("foreign", false, &["mallory"]),
        ];
        let wanted = admins(&["alice"]);

        let removed: Vec<String> = bindings_to_remove(&existing, &wanted)
            .iter()
            .map(|b| b.name_any())
            .collect();
        assert_eq!(removed, vec!["admin-b".to_string()]);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let wanted = admins(&["alice", "bob"]);
        let mut existing = vec![
            binding("admin-a", true, &["alice"]),
            binding("admin-old", true, &["carol"]),
            binding("foreign", false, &["carol"]),
        ];

        // Simulate the first pass.
        let stale: Vec<String> = bindings_to_remove(&existing, &wanted)
            .iter()
            .map(|b| b.name_any())
            .collect();
        let missing: Vec<String> = admins_to_add(&existing, &wanted)
            .into_iter()
            .map(str::to_string)
            .collect();
        existing.retain(|b| !stale.contains(&b.name_any()));
        for (i, admin) in missing.iter().enumerate() {
            existing.push(binding(&format!("admin-new-{i}"), true, &[admin.as_str()]));
        }

        assert!(bindings_to_remove(&existing, &wanted).is_empty());
        assert!(admins_to_add(&existing, &wanted).is_empty());
        assert!(existing.iter().any(|b| b.name_any() == "foreign"));
    }

    #[test]
    fn test_admin_sharing_a_stale_binding_is_rebound() {
        let existing = vec![binding("admin-shared", true, &["alice", "mallory"])];
        let wanted = admins(&["alice"]);

        let removed: Vec<String> = bindings_to_remove(&existing, &wanted)
            .iter()
            .map(|b| b.name_any())
            .collect();
        assert_eq!(removed, vec!["admin-shared".to_string()]);
        assert_eq!(admins_to_add(&existing, &wanted), vec!["alice"]);
    }

    #[test]
    fn test_admin_on_a_kept_shared_binding_is_not_rebound() {
        let existing = vec![binding("admin-shared", true, &["alice", "bob"])];
        let wanted = admins(&["alice", "bob"]);

        assert!(bindings_to_remove(&existing, &wanted).is_empty());
        assert!(admins_to_add(&existing, &wanted).is_empty());
    }

    #[test]
    fn test_empty_administrators_removes_all_managed() {
        let existing = vec![
            binding("admin-a", true, &["alice"]),
            binding("foreign", false, &["bob"]),
        ];
        assert_eq!(bindings_to_remove(&existing, &[]).len(), 1);
    }
}
