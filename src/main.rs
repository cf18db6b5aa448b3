fn main() -> anyhow::Result<()> {
    classtimer_lib::run()
}
