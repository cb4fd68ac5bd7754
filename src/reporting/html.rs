//! Self-contained HTML dashboard.
//!
//! One summary card per category followed by one table per category. Failed
//! checks render an error row instead of a misleading "safe" row. Every value
//! taken from the report is escaped.

use std::fmt::Write as FmtWrite;

use crate::models::{Category, CheckOutcome, Report};

pub const DASHBOARD_FILE_NAME: &str = "cloud_dashboard.html";

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; margin: 20px; background: #f5f6fa; }
h1 { text-align: center; color: #2f3640; }
.meta { text-align: center; color: #636e72; }
.cards { display: flex; justify-content: space-around; margin-bottom: 30px; }
.card { background: #fff; padding: 20px; border-radius: 10px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); text-align: center; width: 18%; }
.card h2 { margin: 10px 0; }
.card.failed h2.count { color: #c0392b; }
table { width: 100%; border-collapse: collapse; margin-bottom: 30px; }
th, td { border: 1px solid #ccc; padding: 8px; text-align: left; }
th { background-color: #2f3640; color: white; }
tr:nth-child(even) { background-color: #f2f2f2; }
.risk { color: red; font-weight: bold; }
.safe { color: green; font-weight: bold; }
.error { color: #c0392b; font-style: italic; }
.detail { color: #636e72; font-size: 0.9em; }
button { background-color: #2f3640; color: white; padding: 10px 20px; border: none; border-radius: 5px; cursor: pointer; margin-bottom: 20px; }
button:hover { background-color: #40739e; }
"#;

const PDF_SCRIPT: &str = r#"<script>
document.getElementById("downloadPdf").addEventListener("click", function() {
    var element = document.getElementById("reportContent");
    var opt = {
      margin: 0.5,
      filename: 'Cloud_Security_Audit_Report.pdf',
      image: { type: 'jpeg', quality: 0.98 },
      html2canvas: { scale: 2 },
      jsPDF: { unit: 'in', format: 'letter', orientation: 'portrait' }
    };
    html2pdf().set(opt).from(element).save();
});
</script>"#;

/// HTML-escape a string to prevent markup injection from resource names.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn section_title(category: Category) -> &'static str {
    match category {
        Category::Storage => "S3 Buckets",
        Category::Network => "EC2 Security Groups",
        Category::Identity => "IAM Users without MFA",
        Category::Database => "Public RDS Instances",
        Category::Compute => "Risky Lambda Functions",
    }
}

fn resource_header(category: Category) -> &'static str {
    match category {
        Category::Storage => "Bucket Name",
        Category::Network => "Security Group",
        Category::Identity => "User",
        Category::Database => "Instance",
        Category::Compute => "Function",
    }
}

fn safe_message(category: Category) -> &'static str {
    match category {
        Category::Storage => "No public buckets",
        Category::Network => "No open security groups",
        Category::Identity => "All users have MFA",
        Category::Database => "No public RDS instances",
        Category::Compute => "No risky Lambda functions",
    }
}

/// Render the dashboard. Pure: the same report always yields the same document.
pub fn render_html(report: &Report) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<title>Cloud Security Audit Dashboard</title>\n");
    let _ = write!(html, "<style>{}</style>\n", STYLE);
    html.push_str(
        "<script src=\"https://cdnjs.cloudflare.com/ajax/libs/html2pdf.js/0.10.1/html2pdf.bundle.min.js\"></script>\n",
    );
    html.push_str("</head>\n<body>\n");

    html.push_str("<h1>Cloud Security Audit Dashboard</h1>\n");
    let _ = writeln!(
        html,
        "<p class=\"meta\">Generated on: {}</p>",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        html,
        "<p class=\"meta\">Region: {} &middot; Provider: {} &middot; Run: {}</p>",
        html_escape(&report.context.region),
        html_escape(&report.context.provider),
        html_escape(&report.run_id),
    );
    html.push_str("<div style=\"text-align:center;\">\n  <button id=\"downloadPdf\">Download PDF</button>\n</div>\n");

    html.push_str("<div id=\"reportContent\">\n<div class=\"cards\">\n");
    for (category, outcome) in &report.outcomes {
        write_card(&mut html, *category, outcome);
    }
    html.push_str("</div>\n");

    for (category, outcome) in &report.outcomes {
        write_table(&mut html, *category, outcome);
    }
    html.push_str("</div>\n");

    html.push_str(PDF_SCRIPT);
    html.push_str("\n</body>\n</html>\n");
    html
}

fn write_card(html: &mut String, category: Category, outcome: &CheckOutcome) {
    let (class, count) = match outcome {
        CheckOutcome::Success { findings } => ("card", findings.len().to_string()),
        CheckOutcome::Failed { .. } => ("card failed", "Error".to_string()),
    };
    let _ = writeln!(
        html,
        "    <div class=\"{}\"><h2>{}</h2><p>{}</p><h2 class=\"count\">{}</h2></div>",
        class,
        category.service_label(),
        category.finding_label(),
        count,
    );
}

fn write_table(html: &mut String, category: Category, outcome: &CheckOutcome) {
    let _ = writeln!(html, "<h2>{}</h2>", section_title(category));
    let _ = writeln!(
        html,
        "<table>\n<tr><th>{}</th><th>Status</th></tr>",
        resource_header(category)
    );

    match outcome {
        CheckOutcome::Failed { error } => {
            let _ = writeln!(
                html,
                "<tr><td colspan='2' class='error'>Error: check could not complete ({})</td></tr>",
                html_escape(&error.cause)
            );
        }
        CheckOutcome::Success { findings } if findings.is_empty() => {
            let _ = writeln!(
                html,
                "<tr><td colspan='2' class='safe'>{}</td></tr>",
                safe_message(category)
            );
        }
        CheckOutcome::Success { findings } => {
            for finding in findings {
                let detail = finding
                    .detail
                    .as_deref()
                    .map(|d| format!("<br><span class='detail'>{}</span>", html_escape(d)))
                    .unwrap_or_default();
                let _ = writeln!(
                    html,
                    "<tr><td>{}{}</td><td class='risk'>{}</td></tr>",
                    html_escape(&finding.resource),
                    detail,
                    html_escape(finding.reason.label()),
                );
            }
        }
    }

    html.push_str("</table>\n");
}
