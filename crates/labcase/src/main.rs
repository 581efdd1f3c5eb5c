fn main() -> anyhow::Result<()> {
    labcase::cli::main()
}
