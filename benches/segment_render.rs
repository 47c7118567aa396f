use chooto::core::message::Message;
use chooto::ui::render::render_assistant;
use chooto::ui::terminal::{format_transcript, Style};
use chooto::ui::theme::Theme;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn make_reply(blocks: usize) -> String {
    let prose = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor";
    let mut reply = String::new();
    for i in 0..blocks {
        reply.push_str(prose);
        if i % 2 == 0 {
            reply.push_str("\n```python\ndef f(x):\n    return x * 2\n```\n");
        } else {
            reply.push_str("\n    indented = True\n    print(indented)\nafter\n");
        }
    }
    reply
}

fn bench_segment_render(c: &mut Criterion) {
    for &blocks in &[10usize, 100usize] {
        let reply = make_reply(blocks);
        let mut group = c.benchmark_group(format!("segment_render_blocks{blocks}"));
        group.throughput(Throughput::Bytes(reply.len() as u64));

        group.bench_function(BenchmarkId::new("parse_render", blocks), |b| {
            b.iter(|| render_assistant(&reply))
        });

        let messages: Vec<Message> = (0..50)
            .map(|_| Message::assistant(&reply, "12:00".into()))
            .collect();
        // Highlighting dominates when on; keep it off to measure layout.
        let style = Style {
            theme: Theme::Dark,
            syntax: false,
            color: true,
        };
        group.bench_function(BenchmarkId::new("format_transcript", blocks), |b| {
            b.iter(|| format_transcript(&messages, style))
        });

        group.finish();
    }
}

criterion_group!(benches, bench_segment_render);
criterion_main!(benches);
