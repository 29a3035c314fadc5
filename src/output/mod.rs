mod progress;
mod styling;
mod tables;

use crate::jenkins::Projection;
use crate::model::Subscription;

pub use progress::Spinner;
pub use styling::{failure, muted, pending, success, title};

/// Prints the tool banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        title("Jenkins widget"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("Build job status and trigger")
    );
}

/// Renders the status of a subscription, one row per branch for multi-branch jobs.
pub fn render_projection(subscription: &Subscription, projection: &Projection) -> String {
    let job = subscription.job_name().unwrap_or_default();
    let mut table = tables::create_table();

    match projection {
        Projection::Pending => {
            return format!("{} {}", job, muted("(status not loaded yet)"));
        }
        Projection::Single(view) => {
            table.set_header(tables::header(&["Job", "Status"]));
            table.add_row(vec![
                comfy_table::Cell::new(job),
                tables::status_cell(&view.status),
            ]);
        }
        Projection::Branches(branches) => {
            table.set_header(tables::header(&["Branch", "Status", "Link"]));
            for branch in branches {
                table.add_row(vec![
                    comfy_table::Cell::new(&branch.tooltip),
                    tables::status_cell(&branch.status),
                    comfy_table::Cell::new(&branch.url),
                ]);
            }
        }
    }

    table.to_string()
}
