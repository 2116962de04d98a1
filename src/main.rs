mod ui;

fn main() {
    gettextrs::setlocale(gettextrs::LocaleCategory::LcAll, "");
    let _ = gettextrs::bindtextdomain("matchup", "/usr/share/locale");
    let _ = gettextrs::textdomain("matchup");

    ui::app::run();
}
