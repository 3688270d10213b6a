/// The xtask binary delegates entirely to nih_plug_xtask, which provides
/// the `bundle` subcommand. Usage:
///
///   cargo xtask bundle loveless-fx --release
///
/// This compiles the library as a cdylib and packages it into
/// `target/bundled/loveless-fx.vst3` and `target/bundled/loveless-fx.clap`.
/// Both bundles expose all four plugins.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
