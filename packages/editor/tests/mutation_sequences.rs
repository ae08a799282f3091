//! Tests for longer edit sequences
//!
//! This tests:
//! - Lazy entries chained several levels deep
//! - Interleaved array and object edits on one module
//! - Repeated generation while editing
//! - Views staying valid after their node is detached

use castwork_editor::{parse_module, Input, Module, ObjectView, Value};
use serde_json::json;

fn config_argument(module: &Module) -> ObjectView {
    let default = module.exports().get("default");
    let call = default.as_call().expect("default export is a call");
    call.argument(0).as_object().cloned().expect("first argument is an object")
}

#[test]
fn test_vite_config_edit_session() {
    let source = r#"import { defineConfig } from "vite";

// https://vitejs.dev/config/
export default defineConfig({
  plugins: [],
  build: {
    // legacy browsers
    target: "es2015",
  },
});
"#;
    let module = parse_module(source).unwrap();
    let options = config_argument(&module);

    let plugins = options.array_entry("plugins").unwrap();
    plugins.push(vec![Input::identifier("vue")]).unwrap();

    options
        .object_entry("server")
        .unwrap()
        .object_entry("hmr")
        .unwrap()
        .set("overlay", false)
        .unwrap();

    let build = options.object_entry("build").unwrap();
    build.or_assign("outDir", "dist").unwrap();
    build.or_assign("target", "esnext").unwrap();

    assert_eq!(
        module.generate().unwrap().code,
        r#"import { defineConfig } from "vite";

// https://vitejs.dev/config/
export default defineConfig({
  plugins: [vue],
  build: {
    // legacy browsers
    target: "es2015",
    outDir: "dist",
  },
  server: {
    hmr: {
      overlay: false,
    },
  },
});
"#
    );
}

#[test]
fn test_end_of_line_comments_follow_their_entries() {
    let module = parse_module(
        "export default defineNuxtConfig({\n  ssr: false, // spa mode\n  modules: ['@nuxt/ui'], // ui kit\n  devtools: { enabled: true },\n})\n",
    )
    .unwrap();
    let options = config_argument(&module);

    options.delete("ssr").unwrap();
    options
        .array_entry("modules")
        .unwrap()
        .push(vec![Input::from("@pinia/nuxt")])
        .unwrap();

    assert_eq!(
        module.generate().unwrap().code,
        "export default defineNuxtConfig({\n  modules: ['@nuxt/ui', '@pinia/nuxt'], // ui kit\n  devtools: { enabled: true },\n})\n"
    );
}

#[test]
fn test_generation_is_repeatable_between_edits() {
    let module = parse_module("export const list = [1, 2]\n").unwrap();
    let list = module.exports().get("list").as_array().cloned().unwrap();

    list.push(vec![3]).unwrap();
    let first = module.generate().unwrap();
    assert_eq!(first, module.generate().unwrap());
    assert_eq!(first.code, "export const list = [1, 2, 3]\n");

    list.shift().unwrap();
    list.unshift(vec![0]).unwrap();
    assert_eq!(module.generate().unwrap().code, "export const list = [0, 2, 3]\n");
}

#[test]
fn test_detached_view_stays_readable() {
    let module = parse_module("export default { old: { keep: 'me' } }").unwrap();
    let config = module.exports().get("default").as_object().cloned().unwrap();

    let old = config.get("old").as_object().cloned().unwrap();
    config.delete("old").unwrap();

    assert_eq!(old.get("keep"), Value::String("me".to_string()));
    assert_eq!(module.generate().unwrap().code, "export default {}");

    // Re-attaching the detached node shares it again
    config.set("restored", &old).unwrap();
    assert_eq!(
        module.generate().unwrap().code,
        "export default { restored: { keep: 'me' } }"
    );
}

#[test]
fn test_replace_container_with_plain_data_and_back() {
    let module = parse_module("export default {\n  list: [1, 2],\n}\n").unwrap();
    let config = module.exports().get("default").as_object().cloned().unwrap();

    config.set("list", json!({ "a": 1 })).unwrap();
    assert_eq!(config.get("list").type_name(), "object");

    config.set("list", json!(["x"])).unwrap();
    let list = config.get("list").as_array().cloned().unwrap();
    assert_eq!(list.to_json(), json!(["x"]));
    assert_eq!(module.generate().unwrap().code, "export default {\n  list: [\"x\"],\n}\n");
}

#[test]
fn test_find_then_edit_found_element() {
    let module = parse_module(
        "export default [\n  { name: 'a', on: false },\n  { name: 'b', on: false },\n]\n",
    )
    .unwrap();
    let items = module.exports().get("default").as_array().cloned().unwrap();

    let found = items
        .find(|item, _, _| {
            item.as_object()
                .is_some_and(|object| object.get("name") == Value::String("b".to_string()))
        })
        .unwrap();
    found.as_object().unwrap().set("on", true).unwrap();

    assert_eq!(
        module.generate().unwrap().code,
        "export default [\n  { name: 'a', on: false },\n  { name: 'b', on: true },\n]\n"
    );
}

#[test]
fn test_new_exports_after_existing_code() {
    let module = parse_module("import a from 'a'\n\nexport default a\n").unwrap();
    let exports = module.exports();

    exports.object_entry("meta").unwrap().set("version", 2).unwrap();
    exports.set("flags", json!([true])).unwrap();

    assert_eq!(exports.keys(), vec!["default", "meta", "flags"]);
    assert_eq!(
        module.generate().unwrap().code,
        "import a from 'a'\n\nexport default a\nexport const meta = {\n  version: 2\n};\nexport const flags = [true];\n"
    );
}
