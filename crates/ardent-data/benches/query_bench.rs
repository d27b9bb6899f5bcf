// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use ardent_data::ecs::{tags, Component, Mutate, Not, World};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

#[derive(Component, Default)]
struct Position(i32);

#[derive(Component, Default)]
struct RenderTag;

fn bench_queries(c: &mut Criterion) {
    let mut world = World::new();

    // Setup 10,000 entities, half of them renderable, one in ten hidden.
    for i in 0..10_000 {
        let id = if i % 2 == 0 {
            world.create_entity_with((Position(i), RenderTag))
        } else {
            world.create_entity_with((Position(i),))
        };
        if i % 10 == 0 {
            world.add_tag(id, tags::HIDDEN);
        }
    }

    let mut group = c.benchmark_group("ECS Queries");

    group.bench_function("Intersection (Position & RenderTag)", |b| {
        b.iter(|| {
            let mut count = 0;
            for (_, (pos, _tag)) in world.query_ref::<(&Position, &RenderTag)>(&[]) {
                count += pos.0;
                black_box(count);
            }
        });
    });

    group.bench_function("Single set (Position)", |b| {
        b.iter(|| {
            let mut count = 0;
            for (_, pos) in world.query_ref::<&Position>(&[]) {
                count += pos.0;
                black_box(count);
            }
        });
    });

    group.bench_function("Exclusion and tag filter", |b| {
        b.iter(|| {
            let query = world.query_ref::<(&Position, Not<RenderTag>)>(&["!hidden"]);
            black_box(query.len());
        });
    });

    group.bench_function("Mutation (Position)", |b| {
        b.iter(|| {
            for (_, pos) in world.query::<Mutate<Position>>(&[]) {
                pos.0 = black_box(pos.0.wrapping_add(1));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);
