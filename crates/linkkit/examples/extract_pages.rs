//! Example: Fetch live pages and show what extraction finds
//!
//! Run with: cargo run -p linkkit --example extract_pages
//!
//! Only fetch and extract run here, so no completion API key is needed.

use linkkit::{extract_content, fetch_page, EnrichError};

struct Case {
    url: &'static str,
    description: &'static str,
    expect_title: Option<&'static str>,
}

const CASES: &[Case] = &[
    Case {
        url: "https://example.com",
        description: "Simple HTML page",
        expect_title: Some("Example Domain"),
    },
    Case {
        url: "https://httpbin.org/html",
        description: "Page without a title element (first heading)",
        expect_title: Some("Herman Melville - Moby-Dick"),
    },
    Case {
        url: "https://httpbin.org/json",
        description: "JSON endpoint (rejected)",
        expect_title: None,
    },
];

#[tokio::main]
async fn main() {
    println!("LinkKit Extraction Examples");
    println!("===========================\n");

    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in CASES.iter().enumerate() {
        println!("{}. {}", i + 1, case.description);
        println!("   URL: {}", case.url);

        let outcome = match fetch_page(case.url).await {
            Ok(page) => extract_content(&page.html, &page.url),
            Err(e) => Err(e),
        };

        let ok = match (&outcome, case.expect_title) {
            (Ok(content), Some(expected)) => {
                println!("   Title: {}", content.title);
                println!("   Text:  {}", preview(&content.body_text));
                content.title == expected
            }
            (Err(EnrichError::UnsupportedContentType(ct)), None) => {
                println!("   Rejected content type: {}", ct);
                true
            }
            (Ok(content), None) => {
                println!("   Unexpected success: {}", content.title);
                false
            }
            (Err(e), _) => {
                println!("   Error: {}", e);
                false
            }
        };

        if ok {
            passed += 1;
            println!("   PASS\n");
        } else {
            failed += 1;
            println!("   FAIL\n");
        }
    }

    println!("Results: {} passed, {} failed", passed, failed);
    if failed > 0 {
        std::process::exit(1);
    }
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(80).collect();
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head
    }
}
