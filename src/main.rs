use strafe::error::AppResult;

fn main() -> AppResult<()> {
    strafe::run()
}
