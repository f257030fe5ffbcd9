//! The built-in catalog shipped with the platform.

use pkg_types::rbac::RoleScope::{Cluster, Project, Unscoped};

use crate::builder::RoleBuilder;
use crate::definition::Catalog;

const MGMT: &str = "management.cattle.io";
const PROJECT: &str = "project.cattle.io";

const READ: &[&str] = &["get", "list", "watch"];
const ALL: &[&str] = &["*"];

const WORKLOAD_RESOURCES: &[&str] = &[
    "pods",
    "pods/attach",
    "pods/exec",
    "pods/portforward",
    "pods/proxy",
    "replicationcontrollers",
    "replicationcontrollers/scale",
    "daemonsets",
    "deployments",
    "deployments/rollback",
    "deployments/scale",
    "replicasets",
    "replicasets/scale",
    "statefulsets",
    "cronjobs",
    "jobs",
    "horizontalpodautoscalers",
];

const WORKLOAD_STATUS_RESOURCES: &[&str] = &[
    "limitranges",
    "pods/log",
    "pods/status",
    "replicationcontrollers/status",
    "resourcequotas",
    "resourcequotas/status",
    "bindings",
];

/// Global roles and role templates, in declaration order.
pub fn default_catalog() -> Catalog {
    let mut rb = RoleBuilder::new();
    declare_global_roles(&mut rb);
    declare_role_templates(&mut rb);
    rb.build()
}

#[rustfmt::skip]
fn declare_global_roles(rb: &mut RoleBuilder) {
    rb.add_role("Create Clusters", "clusters-create")
        .add_rule().api_groups(&[MGMT]).resources(&["clusters"]).verbs(&["create"])
        .add_rule().api_groups(&[MGMT]).resources(&["templates", "templateversions"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["nodedrivers"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["podsecuritypolicytemplates"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["nodetemplates"]).verbs(ALL);
    rb.add_role("Manage Node Drivers", "nodedrivers-manage")
        .add_rule().api_groups(&[MGMT]).resources(&["nodedrivers"]).verbs(ALL);
    rb.add_role("Manage Catalogs", "catalogs-manage")
        .add_rule().api_groups(&[MGMT]).resources(&["catalogs", "templates", "templateversions"]).verbs(ALL);
    rb.add_role("Use Catalog Templates", "catalogs-use")
        .add_rule().api_groups(&[MGMT]).resources(&["templates", "templateversions"]).verbs(READ);
    rb.add_role("Manage Users", "users-manage")
        .add_rule().api_groups(&[MGMT]).resources(&["users", "globalroles", "globalrolebindings"]).verbs(ALL);
    rb.add_role("Manage Roles", "roles-manage")
        .add_rule().api_groups(&[MGMT]).resources(&["roletemplates"]).verbs(ALL);
    rb.add_role("Manage Authentication", "authn-manage")
        .add_rule().api_groups(&[MGMT]).resources(&["authconfigs"]).verbs(&["get", "list", "watch", "update"]);
    rb.add_role("Manage Settings", "settings-manage")
        .add_rule().api_groups(&[MGMT]).resources(&["settings"]).verbs(ALL);
    rb.add_role("Manage PodSecurityPolicy Templates", "podsecuritypolicytemplates-manage")
        .add_rule().api_groups(&[MGMT]).resources(&["podsecuritypolicytemplates"]).verbs(ALL);

    rb.add_role("Admin", "admin")
        .add_rule().api_groups(&["*"]).resources(&["*"]).verbs(ALL)
        .add_rule().api_groups(&[]).non_resource_urls(&["*"]).verbs(ALL);

    rb.add_role("User", "user")
        .add_rule().api_groups(&[MGMT]).resources(&["principals", "roletemplates"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["users"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["preferences"]).verbs(ALL)
        .add_rule().api_groups(&[MGMT]).resources(&["settings"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["clusters"]).verbs(&["create"])
        .add_rule().api_groups(&[MGMT]).resources(&["templates", "templateversions"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["nodedrivers"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["podsecuritypolicytemplates"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["nodetemplates"]).verbs(ALL);

    rb.add_role("User Base", "user-base")
        .add_rule().api_groups(&[MGMT]).resources(&["principals", "roletemplates"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["users"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["preferences"]).verbs(ALL)
        .add_rule().api_groups(&[MGMT]).resources(&["settings"]).verbs(READ);
}

#[rustfmt::skip]
fn declare_role_templates(rb: &mut RoleBuilder) {
    // Kubernetes default roles; their rules live in the downstream clusters.
    rb.add_role_template("Kubernetes cluster-admin", "cluster-admin", Cluster, true, true, true);
    rb.add_role_template("Kubernetes admin", "admin", Project, true, true, true);
    rb.add_role_template("Kubernetes edit", "edit", Project, true, true, true);
    rb.add_role_template("Kubernetes view", "view", Project, true, true, true);

    // Cluster roles
    rb.add_role_template("Cluster Owner", "cluster-owner", Cluster, true, false, false)
        .add_rule().api_groups(&["*"]).resources(&["*"]).verbs(ALL)
        .add_rule().api_groups(&[]).non_resource_urls(&["*"]).verbs(ALL);

    rb.add_role_template("Cluster Member", "cluster-member", Cluster, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["clusterroletemplatebindings"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["projects"]).verbs(&["create"])
        .add_rule().api_groups(&[MGMT]).resources(&["nodes", "nodepools"]).verbs(READ)
        .add_rule().api_groups(&["*"]).resources(&["nodes"]).verbs(READ)
        .add_rule().api_groups(&["*"]).resources(&["persistentvolumes"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["clusterevents"]).verbs(READ);

    rb.add_role_template("Create Projects", "projects-create", Cluster, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["projects"]).verbs(&["create"]);
    rb.add_role_template("View All Projects", "projects-view", Cluster, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["projects"]).verbs(READ);

    rb.add_role_template("Manage Nodes", "nodes-manage", Cluster, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["nodes", "nodepools"]).verbs(ALL)
        .add_rule().api_groups(&["*"]).resources(&["nodes"]).verbs(ALL);
    rb.add_role_template("View Nodes", "nodes-view", Cluster, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["nodes", "nodepools"]).verbs(READ)
        .add_rule().api_groups(&["*"]).resources(&["nodes"]).verbs(READ);

    rb.add_role_template("Manage Volumes", "volumes-manage", Cluster, true, false, false)
        .add_rule().api_groups(&["*"]).resources(&["persistentvolumes"]).verbs(ALL);
    rb.add_role_template("Use Volumes", "volumes-use", Cluster, true, false, false)
        .add_rule().api_groups(&["*"]).resources(&["persistentvolumes"]).verbs(READ);

    rb.add_role_template("Manage Cluster Members", "clusterroletemplatebindings-manage", Cluster, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["clusterroletemplatebindings"]).verbs(ALL);
    rb.add_role_template("View Cluster Members", "clusterroletemplatebindings-view", Cluster, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["clusterroletemplatebindings"]).verbs(READ);

    // Project roles
    rb.add_role_template("Project Owner", "project-owner", Project, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["projectroletemplatebindings"]).verbs(ALL)
        .add_rule().api_groups(&[PROJECT]).resources(&["workloads"]).verbs(ALL)
        .add_rule().api_groups(&[MGMT]).resources(&["clusterevents"]).verbs(READ)
        .add_rule().api_groups(&[""]).resources(&["namespaces"]).verbs(&["create"])
        .set_role_template_names(&["admin"]);

    rb.add_role_template("Project Member", "project-member", Project, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["projectroletemplatebindings"]).verbs(READ)
        .add_rule().api_groups(&[PROJECT]).resources(&["workloads"]).verbs(ALL)
        .add_rule().api_groups(&[""]).resources(&["namespaces"]).verbs(&["create"])
        .add_rule().api_groups(&[MGMT]).resources(&["clusterevents"]).verbs(READ)
        .set_role_template_names(&["edit"]);

    rb.add_role_template("Read-only", "read-only", Project, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["projectroletemplatebindings"]).verbs(READ)
        .add_rule().api_groups(&[PROJECT]).resources(&["workloads"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["clusterevents"]).verbs(READ)
        .set_role_template_names(&["view"]);

    rb.add_role_template("Create Namespaces", "create-ns", Project, true, false, false)
        .add_rule().api_groups(&[""]).resources(&["namespaces"]).verbs(&["create"]);

    rb.add_role_template("Manage Workloads", "workloads-manage", Project, true, false, false)
        .add_rule().api_groups(&["*"]).resources(WORKLOAD_RESOURCES).verbs(ALL)
        .add_rule().api_groups(&["*"]).resources(WORKLOAD_STATUS_RESOURCES).verbs(READ);
    rb.add_role_template("View Workloads", "workloads-view", Project, true, false, false)
        .add_rule().api_groups(&["*"]).resources(WORKLOAD_RESOURCES).verbs(READ)
        .add_rule().api_groups(&["*"]).resources(WORKLOAD_STATUS_RESOURCES).verbs(READ);

    // Plain manage/view pairs over project-scoped resources.
    let pairs: &[(&str, &str, &str, &str, &[&str])] = &[
        ("Manage Ingress", "View Ingress", "ingress-manage", "ingress-view", &["ingresses"]),
        ("Manage Services", "View Services", "services-manage", "services-view", &["services", "endpoints"]),
        ("Manage Secrets", "View Secrets", "secrets-manage", "secrets-view", &["secrets"]),
        ("Manage Config Maps", "View Config Maps", "configmaps-manage", "configmaps-view", &["configmaps"]),
        ("Manage Volumes", "View Volumes", "persistentvolumeclaims-manage", "persistentvolumeclaims-view", &["persistentvolumeclaims"]),
        ("Manage Service Accounts", "View Service Accounts", "serviceaccounts-manage", "serviceaccounts-view", &["serviceaccounts"]),
    ];
    for (manage_display, view_display, manage, view, resources) in pairs {
        rb.add_role_template(manage_display, manage, Project, true, false, false)
            .add_rule().api_groups(&["*"]).resources(resources).verbs(ALL);
        rb.add_role_template(view_display, view, Project, true, false, false)
            .add_rule().api_groups(&["*"]).resources(resources).verbs(READ);
    }

    rb.add_role_template("Manage Project Members", "projectroletemplatebindings-manage", Project, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["projectroletemplatebindings"]).verbs(ALL);
    rb.add_role_template("View Project Members", "projectroletemplatebindings-view", Project, true, false, false)
        .add_rule().api_groups(&[MGMT]).resources(&["projectroletemplatebindings"]).verbs(READ);

    // Unscoped
    rb.add_role_template("View Events", "events-view", Unscoped, true, false, false)
        .add_rule().api_groups(&["*"]).resources(&["events"]).verbs(READ)
        .add_rule().api_groups(&[MGMT]).resources(&["clusterevents"]).verbs(READ);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingStore;
    use pkg_types::rbac::{RoleKind, RoleScope};

    #[test]
    fn catalog_has_expected_shape() {
        let catalog = default_catalog();
        assert_eq!(catalog.global_roles().count(), 12);
        assert_eq!(catalog.role_templates().count(), 35);

        let admin = catalog.global_role("admin").unwrap();
        assert!(admin.administrative);
        assert_eq!(admin.rules[1].non_resource_urls, vec!["*".to_string()]);
        assert!(catalog.global_roles().filter(|r| r.administrative).count() == 1);
    }

    #[test]
    fn kubernetes_defaults_are_hidden_placeholders() {
        let catalog = default_catalog();
        for name in ["cluster-admin", "admin", "edit", "view"] {
            let template = catalog.role_template(name).unwrap();
            assert!(template.hidden && template.builtin, "{}", name);
            assert!(template.rules.is_empty(), "{}", name);
        }
    }

    #[test]
    fn composed_templates_reference_declared_templates() {
        let catalog = default_catalog();
        for template in catalog.role_templates() {
            for parent in &template.role_template_names {
                assert!(
                    catalog.role_template(parent).is_some(),
                    "{} references unknown template {}",
                    template.name,
                    parent
                );
            }
        }
        assert_eq!(
            catalog.role_template("project-member").unwrap().role_template_names,
            vec!["edit".to_string()]
        );
    }

    #[test]
    fn scopes_follow_declaration() {
        let catalog = default_catalog();
        assert_eq!(catalog.role_template("nodes-view").unwrap().scope, RoleScope::Cluster);
        assert_eq!(catalog.role_template("secrets-view").unwrap().scope, RoleScope::Project);
        assert_eq!(catalog.role_template("events-view").unwrap().scope, RoleScope::Unscoped);
        assert_eq!(
            catalog.role_template("persistentvolumeclaims-manage").unwrap().display_name,
            "Manage Volumes"
        );
    }

    #[tokio::test]
    async fn default_catalog_converges_and_stays_converged() {
        let store = RecordingStore::new();
        let catalog = default_catalog();

        let global = catalog.reconcile_global_roles(&store).await.unwrap();
        let templates = catalog.reconcile_role_templates(&store).await.unwrap();
        assert_eq!(global.created.len(), 12);
        assert_eq!(templates.created.len(), 35);

        for definition in catalog.role_templates() {
            let stored = store
                .roles(RoleKind::RoleTemplate)
                .await
                .into_iter()
                .find(|r| r.meta.name == definition.name)
                .unwrap();
            assert!(definition.matches(&stored), "{}", definition.name);
        }

        store.clear_writes();
        catalog.reconcile_global_roles(&store).await.unwrap();
        catalog.reconcile_role_templates(&store).await.unwrap();
        assert!(store.writes().is_empty());
    }
}
