//! Server-rendered HTML pages.
//!
//! The pages are static; everything dynamic is fetched by small scripts from
//! the JSON and text endpoints.

const STYLE: &str = r#"<style>
  body { font-family: Arial, sans-serif; background-color: #f4f4f4; display: flex;
         justify-content: center; align-items: center; min-height: 100vh; margin: 0; }
  .container { background-color: #fff; padding: 20px; border-radius: 8px;
               box-shadow: 0 2px 4px rgba(0,0,0,0.1); width: 100%; max-width: 480px; text-align: center; }
  h2 { color: #333; }
  input[type="text"], input[type="password"] { width: calc(100% - 20px); padding: 10px; margin: 8px 0;
                                                border: 1px solid #ddd; border-radius: 4px; }
  button, .button-link { background-color: #007bff; color: white; padding: 10px 15px; border: none;
                         border-radius: 4px; cursor: pointer; font-size: 16px; margin-top: 10px;
                         display: inline-block; text-decoration: none; }
  button:hover, .button-link:hover { background-color: #0056b3; }
  .danger { background-color: #dc3545; }
  .danger:hover { background-color: #c82333; }
  .error { color: #c00; font-size: 0.9em; margin-top: 5px; }
  .success { color: #080; font-size: 0.9em; margin-top: 5px; }
  table { width: 100%; border-collapse: collapse; margin-top: 15px; }
  th, td { padding: 6px; border-bottom: 1px solid #eee; text-align: left; }
</style>"#;

/// Login form. `?error=1` means bad credentials, `?error=2` an expired session.
pub fn login_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Login</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
{STYLE}
</head>
<body>
<div class="container">
  <h2>RFID Access System</h2>
  <form action="/login" method="post">
    <p>User: <input type="text" name="username" required></p>
    <p>Password: <input type="password" name="password" required></p>
    <button type="submit">Login</button>
    <p class="error" id="loginError"></p>
  </form>
</div>
<script>
  const error = new URLSearchParams(window.location.search).get('error');
  if (error === '1') {{
    document.getElementById('loginError').innerText = 'Wrong user or password.';
  }} else if (error === '2') {{
    document.getElementById('loginError').innerText = 'Please log in first.';
  }}
</script>
</body>
</html>"#
    )
}

/// Management page: open door, roster with remove buttons, logout.
///
/// Logout expires the cookie called `cookie_name`.
pub fn dashboard_page(cookie_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Dashboard</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
{STYLE}
</head>
<body>
<div class="container">
  <h2>Access Control</h2>
  <button onclick="openDoor()">Open Door</button>
  <a class="button-link" href="/register">Register User</a>
  <button class="danger" onclick="logout()">Logout</button>
  <p id="message"></p>
  <table>
    <thead><tr><th>RA</th><th>Name</th><th>UID</th><th></th></tr></thead>
    <tbody id="userList"></tbody>
  </table>
</div>
<script>
  function show(text, ok) {{
    const el = document.getElementById('message');
    el.className = ok ? 'success' : 'error';
    el.innerText = text;
  }}
  function openDoor() {{
    fetch('/openDoor', {{ method: 'POST' }})
      .then(r => r.text().then(t => show(t, r.ok)))
      .catch(() => show('Request failed.', false));
  }}
  function logout() {{
    document.cookie = '{cookie_name}=; expires=Thu, 01 Jan 1970 00:00:00 UTC; path=/;';
    window.location.href = '/';
  }}
  function removeUser(ra) {{
    if (!confirm('Remove user ' + ra + '?')) return;
    fetch('/removeUser', {{
      method: 'POST',
      headers: {{ 'Content-Type': 'application/x-www-form-urlencoded' }},
      body: 'ra=' + encodeURIComponent(ra)
    }})
      .then(r => r.text().then(t => {{ show(t, r.ok); loadUsers(); }}))
      .catch(() => show('Request failed.', false));
  }}
  function loadUsers() {{
    fetch('/getUsers')
      .then(r => r.json())
      .then(data => {{
        const list = document.getElementById('userList');
        list.innerHTML = '';
        data.users.forEach(user => {{
          const row = list.insertRow();
          row.insertCell().innerText = user.ra;
          row.insertCell().innerText = user.name;
          row.insertCell().innerText = user.uid;
          const button = document.createElement('button');
          button.className = 'danger';
          button.innerText = 'Remove';
          button.onclick = () => removeUser(user.ra);
          row.insertCell().appendChild(button);
        }});
      }})
      .catch(() => show('Could not load users.', false));
  }}
  loadUsers();
</script>
</body>
</html>"#
    )
}

/// Registration page; the UID field follows the last scanned card.
pub fn register_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Register</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
{STYLE}
</head>
<body>
<div class="container">
  <h2>Register User</h2>
  <p>Tap a card on the reader to fill in its UID.</p>
  <form id="registerForm">
    <p>RA: <input type="text" id="ra" name="ra" required></p>
    <p>Name: <input type="text" id="name" name="name" required></p>
    <p>UID: <input type="text" id="uid" name="uid" required></p>
    <button type="submit">Register</button>
  </form>
  <p id="message"></p>
  <a class="button-link" href="/dashboard">Back</a>
</div>
<script>
  function pollUid() {{
    fetch('/getLastScannedUid')
      .then(r => r.text())
      .then(uid => {{
        if (uid !== 'No UID') document.getElementById('uid').value = uid;
      }})
      .catch(() => {{}});
  }}
  setInterval(pollUid, 1000);
  document.getElementById('registerForm').addEventListener('submit', event => {{
    event.preventDefault();
    const message = document.getElementById('message');
    fetch('/registerUser', {{
      method: 'POST',
      body: new URLSearchParams(new FormData(event.target))
    }})
      .then(r => r.text().then(t => {{
        message.className = r.ok ? 'success' : 'error';
        message.innerText = t;
        if (r.ok) event.target.reset();
      }}))
      .catch(() => {{
        message.className = 'error';
        message.innerText = 'Request failed.';
      }});
  }});
</script>
</body>
</html>"#
    )
}
