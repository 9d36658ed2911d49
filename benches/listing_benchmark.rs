use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use questioneer::model::memory::MemoryStore;
use questioneer::model::types::QuestionnaireDetail;
use questioneer::model::SharedStore;
use questioneer::service::listing::Resolver;
use questioneer::web::messages::pagination::{PageRequest, Sort, SortBy, SortOrder};

fn seeded(runtime: &tokio::runtime::Runtime, n: i64) -> Resolver {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    runtime.block_on(async {
        for i in 0..n {
            let at = start + Duration::minutes(i);
            let detail = QuestionnaireDetail {
                id: format!("q{:06}", i),
                name: format!("Questionnaire {}", i % 97),
                description: "benchmark questionnaire".into(),
                created_at: at,
                updated_at: at,
                response_count: i % 13,
                questions: vec![],
            };
            store.import(detail).await.expect("seed");
        }
    });
    Resolver::new(store)
}

async fn walk(resolver: &Resolver, sort: Sort, limit: i64) -> usize {
    let mut total = 0;
    let mut cursor = None;
    loop {
        let page = resolver.listing(&PageRequest::new(cursor.take(), limit, sort).expect("request")).await.expect("page");
        total += page.questionnaires.len();
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return total,
        }
    }
}

fn benchmark_listing(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let resolver = seeded(&runtime, 2_000);

    c.bench_function("listing_first_page_created_at", |b| {
        b.to_async(&runtime).iter(|| async {
            let request = PageRequest::first(50, Sort::default()).expect("request");
            black_box(resolver.listing(&request).await.expect("page"))
        })
    });

    c.bench_function("listing_full_walk_name_asc", |b| {
        b.to_async(&runtime).iter(|| async { black_box(walk(&resolver, Sort::new(SortBy::Name, SortOrder::Asc), 50).await) })
    });
}

criterion_group!(benches, benchmark_listing);
criterion_main!(benches);
