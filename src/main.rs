fn main() -> std::io::Result<()> {
    esmart::run()
}
