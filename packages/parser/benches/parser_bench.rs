use castwork_parser::{parse, print, PrintOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const CONFIG: &str = r#"
import { defineConfig } from "vite";
import vue from "@vitejs/plugin-vue";

// https://vitejs.dev/config/
export default defineConfig({
  plugins: [vue()],
  server: {
    port: 3000,
    proxy: {
      "/api": { target: "http://localhost:8080", changeOrigin: true },
    },
  },
  build: {
    outDir: "dist",
    sourcemap: false,
    rollupOptions: { external: ["lodash", "dayjs"] },
  },
});
"#;

fn parse_config(c: &mut Criterion) {
    c.bench_function("parse_config", |b| b.iter(|| parse(black_box(CONFIG))));
}

fn print_config(c: &mut Criterion) {
    let tree = parse(CONFIG).expect("bench source parses");
    let options = PrintOptions::default();

    c.bench_function("print_config", |b| {
        b.iter(|| print(black_box(&tree), tree.root(), &options))
    });
}

criterion_group!(benches, parse_config, print_config);
criterion_main!(benches);
