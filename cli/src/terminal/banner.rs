use colored::*;

use crate::terminal::colors;

const ART: &str = r#"
          __                                         .__
         |__|  ______  ____  _____   _______   ____  |  |__
         |  | /  ___/_/ __ \ \__  \  \_  __ \_/ ___\ |  |  \
         |  | \___ \ \  ___/  / __ \_ |  | \/\  \___ |   Y  \
     /\__|  |/____  > \___  >(____  / |__|    \___  >|___|  /
     \______|     \/      \/      \/              \/      \/
"#;

pub fn print() {
    for line in ART.lines().skip(1) {
        super::print::print(&format!("{}", line.color(colors::PRIMARY).bold()));
    }
    super::print::centerln(&format!("{}", "JavaScript Search Tool".color(colors::ACCENT)));
}
