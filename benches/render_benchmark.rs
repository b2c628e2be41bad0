use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fortune_admin::db::Document;
use fortune_admin::models::{FortuneRow, UserRecord};
use fortune_admin::services::admin::{render_fortune_row, render_user_row};
use serde_json::json;

fn document(key: String, value: serde_json::Value) -> Document {
    Document {
        key,
        fields: value.as_object().cloned().expect("object literal"),
    }
}

fn benchmark_render_tables(c: &mut Criterion) {
    // A busy console: a few thousand users, ten times as many fortunes
    let users: Vec<UserRecord> = (0..5_000)
        .map(|i| {
            UserRecord::from_document(&document(
                format!("uid-{i}"),
                json!({"email": format!("user{i}@example.com"), "freeUsed": i % 2 == 0, "premium": i % 7 == 0}),
            ))
        })
        .collect();

    let fortunes: Vec<FortuneRow> = (0..50_000)
        .map(|i| {
            FortuneRow::from_document(&document(
                format!("f-{i}"),
                json!({
                    "user": format!("user{}@example.com", i % 5_000),
                    "type": "tarot",
                    "question": "<b>Aşk hayatım nasıl olacak?</b>",
                    "createdAt": "2026-03-01T12:00:00Z",
                }),
            ))
        })
        .collect();

    let mut group = c.benchmark_group("admin_tables");

    group.bench_function("user_rows", |b| {
        b.iter(|| {
            black_box(&users)
                .iter()
                .map(render_user_row)
                .collect::<String>()
        })
    });

    group.bench_function("fortune_rows", |b| {
        b.iter(|| {
            black_box(&fortunes)
                .iter()
                .map(render_fortune_row)
                .collect::<String>()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_render_tables);
criterion_main!(benches);
