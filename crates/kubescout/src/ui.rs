//! Console output helpers.

use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use kubescout_cloud::Cluster;

use crate::kubeconfig::Kubeconfig;

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

fn status_color(status: &str) -> Color {
    match status.to_ascii_lowercase().as_str() {
        "active" | "running" | "succeeded" => Color::Green,
        "creating" | "provisioning" | "updating" | "reconciling" | "upgrading" => Color::Yellow,
        "failed" | "error" | "degraded" | "deleting" | "stopping" => Color::Red,
        _ => Color::White,
    }
}

/// Clusters sorted for display: region descending, then name.
#[must_use]
pub fn display_order(clusters: &[Cluster]) -> Vec<&Cluster> {
    let mut rows: Vec<&Cluster> = clusters.iter().collect();
    rows.sort_by(|a, b| b.region.cmp(&a.region).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Create a table of discovered clusters.
///
/// The context column shows the context `template` would produce and the
/// last column whether `kubeconfig` already has a context for the cluster.
pub fn cluster_table(clusters: &[Cluster], kubeconfig: &Kubeconfig, template: &str) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::Cyan),
        Cell::new("Cluster Name").fg(Color::Cyan),
        Cell::new("Region").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
        Cell::new("Context Name").fg(Color::Cyan),
        Cell::new("Exported Locally").fg(Color::Cyan),
    ]);

    for (index, cluster) in display_order(clusters).into_iter().enumerate() {
        let exported = kubeconfig.is_exported(&cluster.endpoint);
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&cluster.name),
            Cell::new(&cluster.region),
            Cell::new(&cluster.status).fg(status_color(&cluster.status)),
            Cell::new(cluster.context_name(template)),
            if exported {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("no").fg(Color::DarkGrey)
            },
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use kubescout_cloud::{Provider, DEFAULT_CONTEXT_TEMPLATE};

    use super::*;

    fn cluster(name: &str, region: &str) -> Cluster {
        Cluster {
            provider: Provider::Aws,
            name: name.to_string(),
            region: region.to_string(),
            id: format!("arn:{name}"),
            endpoint: format!("https://{name}.example.test"),
            certificate_authority_data: b"pem".to_vec(),
            status: "ACTIVE".to_string(),
        }
    }

    #[test]
    fn test_display_order_region_descending() {
        let clusters = vec![
            cluster("b", "eu-west-1"),
            cluster("a", "us-east-1"),
            cluster("c", "ap-south-1"),
            cluster("a", "eu-west-1"),
        ];
        let order: Vec<(&str, &str)> = display_order(&clusters)
            .into_iter()
            .map(|c| (c.region.as_str(), c.name.as_str()))
            .collect();
        assert_eq!(
            order,
            [
                ("us-east-1", "a"),
                ("eu-west-1", "a"),
                ("eu-west-1", "b"),
                ("ap-south-1", "c"),
            ]
        );
    }

    #[test]
    fn test_cluster_table_rows() {
        let clusters = vec![cluster("web", "us-east-1"), cluster("db", "eu-west-1")];
        let mut kubeconfig = Kubeconfig::new();
        kubeconfig.add_cluster(&clusters[1], None, "db").unwrap();

        let table = cluster_table(&clusters, &kubeconfig, DEFAULT_CONTEXT_TEMPLATE);
        assert_eq!(table.row_iter().count(), 2);

        let rendered = table.to_string();
        assert!(rendered.contains("Exported Locally"));
        assert!(rendered.contains("web"));
        assert!(rendered.contains("yes"));
        assert!(rendered.contains("no"));
    }

    #[test]
    fn test_status_color() {
        assert_eq!(status_color("ACTIVE"), Color::Green);
        assert_eq!(status_color("Succeeded"), Color::Green);
        assert_eq!(status_color("PROVISIONING"), Color::Yellow);
        assert_eq!(status_color("degraded"), Color::Red);
        assert_eq!(status_color(""), Color::White);
    }
}
