use std::{env, path::Path, process::Stdio};

use directories::BaseDirs;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tokio::{fs, process::Command};

use crate::{
    config::CapabilitiesConfig,
    errors::{Result, UserFacingError},
    model::Effect,
};

/// Characters kept verbatim in a url query value
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Operating systems with effector support
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl Platform {
    fn current() -> Self {
        match env::consts::OS {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }
}

/// Runs the effector, waiting for it to complete
pub(super) async fn run(config: &CapabilitiesConfig, effect: Effect) -> Result<()> {
    let platform = Platform::current();
    match effect {
        Effect::CopyText(text) => copy_text(text).await,
        Effect::LaunchApplication(path) => launch_application(platform, path).await,
        Effect::OpenLink(url) => open_target(&url),
        Effect::SearchWeb(query) => open_target(&web_search_target(&config.web_search_url, &query)),
        Effect::SearchYoutube(query) => open_target(&templated_url(&config.youtube_search_url, &query)),
        Effect::ToggleAutostart => toggle_autostart(platform).await,
        Effect::CloseWindow => {
            tracing::debug!("Closing the palette window is handled by the host");
            Ok(())
        }
        effect => run_command(platform_command(platform, &effect)?).await,
    }
}

/// Builds the url to search the web for, opening it directly when the query is already one
fn web_search_target(template: &str, query: &str) -> String {
    if query.starts_with("http") {
        query.to_owned()
    } else {
        templated_url(template, query)
    }
}

/// Replaces the `{}` placeholder in the template with the percent-encoded query
fn templated_url(template: &str, query: &str) -> String {
    template.replace("{}", &utf8_percent_encode(query, QUERY_VALUE).to_string())
}

fn open_target(target: &str) -> Result<()> {
    tracing::info!("Opening {target}");
    open::that_detached(target).map_err(|err| {
        tracing::warn!("Couldn't open {target}: {err}");
        UserFacingError::EffectFailed(format!("couldn't open {target}")).into()
    })
}

async fn launch_application(platform: Platform, path: String) -> Result<()> {
    // Desktop entries must be launched, opening them would edit them instead
    if platform == Platform::Linux
        && path.ends_with(".desktop")
        && let Some(id) = Path::new(&path).file_name().and_then(|n| n.to_str())
    {
        return run_command(argv(["gtk-launch", id])).await;
    }
    open_target(&path)
}

async fn copy_text(text: String) -> Result<()> {
    tokio::task::spawn_blocking(move || arboard::Clipboard::new()?.set_text(text))
        .await?
        .map_err(|err| {
            tracing::warn!("Couldn't write the clipboard: {err}");
            UserFacingError::ClipboardUnavailable.into()
        })
}

/// Spawns the command line and waits for it to exit successfully
async fn run_command(argv: Vec<String>) -> Result<()> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| UserFacingError::EffectFailed(String::from("empty command")))?;
    tracing::info!("Running: {}", argv.join(" "));
    let output = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
    {
        Ok(output) => output,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("{program} is not installed");
            return Err(UserFacingError::EffectFailed(format!("{program} is not installed")).into());
        }
        Err(err) => return Err(err.into()),
    };
    if output.status.success() {
        Ok(())
    } else {
        tracing::warn!(
            "{program} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        Err(UserFacingError::EffectFailed(format!("{program} exited with {}", output.status)).into())
    }
}

fn argv<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.into_iter().map(String::from).collect()
}

fn osascript(script: impl AsRef<str>) -> Vec<String> {
    argv(["osascript", "-e", script.as_ref()])
}

fn nircmd(args: &[&str]) -> Vec<String> {
    let mut argv = vec![String::from("nircmd.exe")];
    argv.extend(args.iter().map(|a| String::from(*a)));
    argv
}

/// Resolves the command line running the effector on the platform
fn platform_command(platform: Platform, effect: &Effect) -> Result<Vec<String>, UserFacingError> {
    use Platform::*;

    let unsupported = |what: &'static str| Err(UserFacingError::UnsupportedPlatform(what));
    let volume_units = |percent: u32| (percent * 65535 / 100).to_string();

    Ok(match (platform, effect) {
        (Linux, Effect::SetVolume(n)) => argv(["pactl", "set-sink-volume", "@DEFAULT_SINK@", &format!("{n}%")]),
        (Linux, Effect::MuteVolume) => argv(["pactl", "set-sink-mute", "@DEFAULT_SINK@", "1"]),
        (Linux, Effect::AdjustVolume(d)) => argv(["pactl", "set-sink-volume", "@DEFAULT_SINK@", &format!("{d:+}%")]),
        (Linux, Effect::SetBrightness(n)) => argv(["brightnessctl", "set", &format!("{n}%")]),
        (Linux, Effect::AdjustBrightness(d)) if *d < 0 => {
            argv(["brightnessctl", "set", &format!("{}%-", d.unsigned_abs())])
        }
        (Linux, Effect::AdjustBrightness(d)) => argv(["brightnessctl", "set", &format!("+{d}%")]),
        (Linux, Effect::MediaPlay) => argv(["playerctl", "play"]),
        (Linux, Effect::MediaPause) => argv(["playerctl", "pause"]),
        (Linux, Effect::MediaSkip) => argv(["playerctl", "next"]),
        (Linux, Effect::MediaPrevious) => argv(["playerctl", "previous"]),
        (Linux, Effect::MinimizeWindow) => argv(["xdotool", "getactivewindow", "windowminimize"]),
        (Linux, Effect::MaximizeWindow) => {
            argv(["wmctrl", "-r", ":ACTIVE:", "-b", "add,maximized_vert,maximized_horz"])
        }
        (Linux, Effect::ResizeWindow80) => argv(["xdotool", "getactivewindow", "windowsize", "80%", "80%"]),
        (Linux, Effect::RestartSystem) => argv(["systemctl", "reboot"]),
        (Linux, Effect::ShutdownSystem) => argv(["systemctl", "poweroff"]),
        (Linux, Effect::LockSystem) => argv(["loginctl", "lock-session"]),
        (Linux, Effect::EmptyTrash) => argv(["gio", "trash", "--empty"]),

        (MacOs, Effect::SetVolume(n)) => osascript(format!("set volume output volume {n}")),
        (MacOs, Effect::MuteVolume) => osascript("set volume output muted true"),
        (MacOs, Effect::AdjustVolume(d)) => osascript(format!(
            "set volume output volume ((output volume of (get volume settings)) {} {})",
            if *d < 0 { '-' } else { '+' },
            d.unsigned_abs()
        )),
        (MacOs, Effect::SetBrightness(n)) => argv(["brightness", &(f64::from(*n) / 100.0).to_string()]),
        (MacOs, Effect::MediaPlay) => osascript(r#"tell application "Music" to play"#),
        (MacOs, Effect::MediaPause) => osascript(r#"tell application "Music" to pause"#),
        (MacOs, Effect::MediaSkip) => osascript(r#"tell application "Music" to next track"#),
        (MacOs, Effect::MediaPrevious) => osascript(r#"tell application "Music" to previous track"#),
        (MacOs, Effect::MinimizeWindow) => osascript(
            r#"tell application "System Events" to set value of attribute "AXMinimized" of front window of (first process whose frontmost is true) to true"#,
        ),
        (MacOs, Effect::MaximizeWindow) => osascript(
            r#"tell application "System Events" to set value of attribute "AXFullScreen" of front window of (first process whose frontmost is true) to true"#,
        ),
        (MacOs, Effect::RestartSystem) => osascript(r#"tell application "System Events" to restart"#),
        (MacOs, Effect::ShutdownSystem) => osascript(r#"tell application "System Events" to shut down"#),
        (MacOs, Effect::LockSystem) => argv(["pmset", "displaysleepnow"]),
        (MacOs, Effect::EmptyTrash) => osascript(r#"tell application "Finder" to empty trash"#),
        (MacOs, Effect::RunNamedShortcut(name)) => argv(["shortcuts", "run", name]),

        (Windows, Effect::SetVolume(n)) => nircmd(&["setsysvolume", &volume_units(u32::from(*n))]),
        (Windows, Effect::MuteVolume) => nircmd(&["mutesysvolume", "1"]),
        (Windows, Effect::AdjustVolume(d)) => {
            let units = volume_units(u32::from(d.unsigned_abs()));
            let delta = if *d < 0 { format!("-{units}") } else { units };
            nircmd(&["changesysvolume", &delta])
        }
        (Windows, Effect::SetBrightness(n)) => argv([
            "powershell",
            "-Command",
            &format!("(Get-WmiObject -Namespace root/WMI -Class WmiMonitorBrightnessMethods).WmiSetBrightness(1,{n})"),
        ]),
        (Windows, Effect::MediaPlay | Effect::MediaPause) => nircmd(&["sendkeypress", "media_play_pause"]),
        (Windows, Effect::MediaSkip) => nircmd(&["sendkeypress", "media_next"]),
        (Windows, Effect::MediaPrevious) => nircmd(&["sendkeypress", "media_prev"]),
        (Windows, Effect::MinimizeWindow) => nircmd(&["win", "min", "foreground"]),
        (Windows, Effect::MaximizeWindow) => nircmd(&["win", "max", "foreground"]),
        (Windows, Effect::RestartSystem) => argv(["shutdown", "/r", "/t", "0"]),
        (Windows, Effect::ShutdownSystem) => argv(["shutdown", "/s", "/t", "0"]),
        (Windows, Effect::LockSystem) => argv(["rundll32.exe", "user32.dll,LockWorkStation"]),
        (Windows, Effect::EmptyTrash) => argv(["powershell", "-Command", "Clear-RecycleBin -Force"]),

        (_, Effect::AdjustBrightness(_)) => return unsupported("Relative brightness"),
        (_, Effect::ResizeWindow80) => return unsupported("Window resizing"),
        (_, Effect::RunNamedShortcut(_)) => return unsupported("Running shortcuts"),
        (_, Effect::SetVolume(_) | Effect::MuteVolume | Effect::AdjustVolume(_)) => {
            return unsupported("Volume control");
        }
        (_, Effect::SetBrightness(_)) => return unsupported("Brightness control"),
        (_, Effect::MediaPlay | Effect::MediaPause | Effect::MediaSkip | Effect::MediaPrevious) => {
            return unsupported("Media control");
        }
        (_, Effect::MinimizeWindow | Effect::MaximizeWindow | Effect::CloseWindow) => {
            return unsupported("Window management");
        }
        (_, Effect::RestartSystem | Effect::ShutdownSystem | Effect::LockSystem | Effect::EmptyTrash) => {
            return unsupported("System management");
        }
        (
            _,
            Effect::CopyText(_)
            | Effect::LaunchApplication(_)
            | Effect::OpenLink(_)
            | Effect::SearchWeb(_)
            | Effect::SearchYoutube(_)
            | Effect::ToggleAutostart,
        ) => return Err(UserFacingError::EffectFailed(String::from("not a command effect"))),
    })
}

/// Registers the palette to run on login, or unregisters it if it already was
async fn toggle_autostart(platform: Platform) -> Result<()> {
    let exe = env::current_exe()?.display().to_string();
    let base = BaseDirs::new().ok_or(UserFacingError::UnsupportedPlatform("Autostart"))?;

    if platform == Platform::Windows {
        const RUN_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run";
        let registered = Command::new("reg")
            .args(["query", RUN_KEY, "/v", "cmdpal"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?
            .success();
        return if registered {
            run_command(argv(["reg", "delete", RUN_KEY, "/v", "cmdpal", "/f"])).await
        } else {
            run_command(argv(["reg", "add", RUN_KEY, "/v", "cmdpal", "/t", "REG_SZ", "/d", &exe, "/f"])).await
        };
    }

    let (path, content) = match platform {
        Platform::Linux => (base.config_dir().join("autostart/cmdpal.desktop"), desktop_autostart(&exe)),
        Platform::MacOs => (
            base.home_dir().join("Library/LaunchAgents/org.cmdpal.plist"),
            launch_agent_autostart(&exe),
        ),
        _ => return Err(UserFacingError::UnsupportedPlatform("Autostart").into()),
    };

    if fs::try_exists(&path).await? {
        fs::remove_file(&path).await?;
        tracing::info!("Autostart disabled, removed {}", path.display());
    } else {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
        tracing::info!("Autostart enabled, created {}", path.display());
    }
    Ok(())
}

fn desktop_autostart(exe: &str) -> String {
    format!("[Desktop Entry]\nType=Application\nName=cmdpal\nExec=\"{exe}\" open\nTerminal=true\n")
}

fn launch_agent_autostart(exe: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>org.cmdpal</string>
    <key>ProgramArguments</key>
    <array>
        <string>{exe}</string>
        <string>open</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_web_search_target() {
        let template = "https://www.google.com/search?q={}";
        assert_eq!(
            web_search_target(template, "rust async & await"),
            "https://www.google.com/search?q=rust%20async%20%26%20await"
        );
        assert_eq!(
            web_search_target(template, "https://docs.rs"),
            "https://docs.rs"
        );
        assert_eq!(
            templated_url("https://www.youtube.com/results?search_query={}", "ñu_clip-1.0"),
            "https://www.youtube.com/results?search_query=%C3%B1u_clip-1.0"
        );
    }

    #[test]
    fn test_platform_command_linux() {
        assert_eq!(
            platform_command(Platform::Linux, &Effect::AdjustVolume(-10)).unwrap(),
            vec!["pactl", "set-sink-volume", "@DEFAULT_SINK@", "-10%"]
        );
        assert_eq!(
            platform_command(Platform::Linux, &Effect::AdjustVolume(5)).unwrap(),
            vec!["pactl", "set-sink-volume", "@DEFAULT_SINK@", "+5%"]
        );
        assert_eq!(
            platform_command(Platform::Linux, &Effect::AdjustBrightness(-20)).unwrap(),
            vec!["brightnessctl", "set", "20%-"]
        );
        assert_eq!(
            platform_command(Platform::Linux, &Effect::SetBrightness(70)).unwrap(),
            vec!["brightnessctl", "set", "70%"]
        );
        assert_eq!(
            platform_command(Platform::Linux, &Effect::RunNamedShortcut(String::from("Focus"))),
            Err(UserFacingError::UnsupportedPlatform("Running shortcuts"))
        );
    }

    #[test]
    fn test_platform_command_macos() {
        assert_eq!(
            platform_command(Platform::MacOs, &Effect::AdjustVolume(-10)).unwrap(),
            vec![
                "osascript",
                "-e",
                "set volume output volume ((output volume of (get volume settings)) - 10)"
            ]
        );
        assert_eq!(
            platform_command(Platform::MacOs, &Effect::SetBrightness(50)).unwrap(),
            vec!["brightness", "0.5"]
        );
        assert_eq!(
            platform_command(Platform::MacOs, &Effect::RunNamedShortcut(String::from("Focus"))).unwrap(),
            vec!["shortcuts", "run", "Focus"]
        );
    }

    #[test]
    fn test_platform_command_windows() {
        assert_eq!(
            platform_command(Platform::Windows, &Effect::SetVolume(100)).unwrap(),
            vec!["nircmd.exe", "setsysvolume", "65535"]
        );
        assert_eq!(
            platform_command(Platform::Windows, &Effect::AdjustVolume(-50)).unwrap(),
            vec!["nircmd.exe", "changesysvolume", "-32767"]
        );
        assert_eq!(
            platform_command(Platform::Windows, &Effect::AdjustBrightness(10)),
            Err(UserFacingError::UnsupportedPlatform("Relative brightness"))
        );
    }

    #[test]
    fn test_platform_command_other() {
        assert_eq!(
            platform_command(Platform::Other, &Effect::MuteVolume),
            Err(UserFacingError::UnsupportedPlatform("Volume control"))
        );
    }

    #[test]
    fn test_autostart_entries() {
        let desktop = desktop_autostart("/usr/bin/cmdpal");
        assert!(desktop.contains("Exec=\"/usr/bin/cmdpal\" open"));
        let plist = launch_agent_autostart("/usr/local/bin/cmdpal");
        assert!(plist.contains("<string>/usr/local/bin/cmdpal</string>"));
    }
}
