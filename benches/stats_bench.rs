//! Benchmarks for journal statistics and image compression
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use moodlog::media::compress_image;
use moodlog::stats::{current_streak, longest_streak, mood_trend, top_tags};
use moodlog::{CompressOptions, JournalEntry, JournalStats, Mood, NewEntry};
use std::io::Cursor;

fn create_test_entries(count: usize) -> Vec<JournalEntry> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
    let tags = ["work", "family", "gratitude", "sleep", "exercise"];

    let mut entries: Vec<JournalEntry> = (0..count)
        .map(|i| {
            // Skip every seventh day so streaks break
            let day = i as i64 + (i as i64 / 6);
            let mut new = NewEntry::new("bench", format!("entry {}", i))
                .tag(tags[i % tags.len()])
                .tag(tags[(i * 3) % tags.len()]);
            if i % 4 != 0 {
                new = new.mood(Mood::new((i % 5 + 1) as u8).unwrap());
            }
            JournalEntry::from_new(new, start + Duration::days(day))
        })
        .collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries
}

fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");

    for size in [100, 1000, 10000] {
        let entries = create_test_entries(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("snapshot_{}", size), |b| {
            b.iter(|| JournalStats::compute_in(black_box(&entries), &Utc))
        });

        group.bench_function(format!("streaks_{}", size), |b| {
            b.iter(|| {
                (
                    current_streak(black_box(&entries), &Utc),
                    longest_streak(black_box(&entries), &Utc),
                )
            })
        });

        group.bench_function(format!("top_tags_{}", size), |b| {
            b.iter(|| top_tags(black_box(&entries)))
        });

        group.bench_function(format!("mood_trend_{}", size), |b| {
            b.iter(|| mood_trend(black_box(&entries)))
        });
    }

    group.finish();
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    group.sample_size(20);

    for (width, height) in [(800, 600), (2400, 1800)] {
        let png = create_test_png(width, height);
        group.throughput(Throughput::Bytes(png.len() as u64));

        group.bench_function(format!("jpeg_{}x{}", width, height), |b| {
            let options = CompressOptions::default().without_thumbnail();
            b.iter(|| compress_image(black_box(&png), &options).unwrap())
        });

        group.bench_function(format!("jpeg_with_thumb_{}x{}", width, height), |b| {
            let options = CompressOptions::default();
            b.iter(|| compress_image(black_box(&png), &options).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stats, bench_compress);
criterion_main!(benches);
