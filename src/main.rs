fn main() {
    vibeflow_lib::run()
}
