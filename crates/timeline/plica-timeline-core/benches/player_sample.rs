use criterion::{black_box, criterion_group, criterion_main, Criterion};
use plica_geometry_core::GeometricModel;
use plica_script_core::SceneScript;
use plica_test_fixtures::scripts;
use plica_timeline_core::{Compiler, TimelinePlayer};

fn bench_player_sample(c: &mut Criterion) {
    let (script, model): (SceneScript, GeometricModel) =
        scripts::load_with_model("cube-tour").expect("fixture pair");
    let out = Compiler::default()
        .compile(&script, &model)
        .expect("fixture compiles");
    let player = TimelinePlayer::new(out.timeline, out.registry);
    let frames = (player.duration() * 60.0) as usize;

    c.bench_function("player_sample_60fps_pass", |b| {
        b.iter(|| {
            for frame in 0..frames {
                let t = frame as f64 / 60.0;
                black_box(player.state_at(black_box(t)).ok());
            }
        });
    });

    c.bench_function("compile_cube_tour", |b| {
        b.iter(|| black_box(Compiler::default().compile(&script, &model).ok()));
    });
}

criterion_group!(benches, bench_player_sample);
criterion_main!(benches);
