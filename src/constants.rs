pub const RES_TX_CLOSED: &str = "Compile state receiver has been dropped";

pub const STYLUS_LOCATOR: &str = "https://cdn.rawgit.com/stylus/stylus-lang.com/615e6e5d33e0954f9a89cf9d6d18fdc7062a87fd/try/stylus.min.js";
pub const STYLUS_EXPORT: &str = "stylus";

pub const SASS_LOCATOR: &str = "https://unpkg.com/sass.js@0.10.9/dist/sass.sync.js";
pub const SASS_EXPORT: &str = "Sass";

pub const LESS_LOCATOR: &str = "https://unpkg.com/less@3.0.1/dist/less.js";
pub const LESS_EXPORT: &str = "less";

pub const TYPESCRIPT_LOCATOR: &str = "https://unpkg.com/typescript@2.4.2/lib/typescriptServices.js";
pub const TYPESCRIPT_EXPORT: &str = "ts";

pub const BABEL_LOCATOR: &str = "https://unpkg.com/@babel/standalone@7.0.0-beta.42/babel.min.js";
pub const BABEL_EXPORT: &str = "Babel";
pub const BABEL_PRESETS: [&str; 3] = ["es2015", "stage-2", "react"];

pub const LIVESCRIPT_LOCATOR: &str = "https://cdn.rawgit.com/gkz/LiveScript/12f0cc856a02c8065a0ab18696a6df6e272b10bd/browser/livescript-min.js";
pub const LIVESCRIPT_EXPORT: &str = "livescript";
pub const LIVESCRIPT_MODULE: &str = "livescript";
pub const REQUIRE_EXPORT: &str = "require";

pub const COFFEESCRIPT_LOCATOR: &str = "https://cdn.rawgit.com/jashkenas/coffeescript/001f97ac399dbcbf2bdcc32e4f2fc9fca4d6869f/docs/v2/browser-compiler/coffeescript.js";
pub const COFFEESCRIPT_EXPORT: &str = "CoffeeScript";

pub const SOURCE_MAPPING_URL: &str = "//# sourceMappingURL=";
