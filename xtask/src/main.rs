/// The xtask binary delegates entirely to nih_plug_xtask, which provides
/// the `bundle` subcommand. Usage:
///
///   cargo xtask bundle loveless-space-v1 --release
///
/// This compiles the library as a cdylib and packages both plugins into
/// `target/bundled/loveless-space-v1.vst3` and `.clap` bundles.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
